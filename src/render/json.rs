//! Flat JSON rendering.
//!
//! One record per package with its direct children, sorted by key.

use serde::Serialize;
use std::io::{self, Write};

use super::{child_identity, RenderOptions, Renderer};
use crate::graph::DependencyGraph;

/// Flat JSON renderer.
pub struct JsonRenderer;

/// Serializable package for JSON output.
#[derive(Serialize)]
struct JsonPackage<'a> {
    key: &'a str,
    name: &'a str,
    version: Option<&'a str>,
}

/// Serializable child entry for JSON output.
#[derive(Serialize)]
struct JsonDependency<'a> {
    key: &'a str,
    name: &'a str,
    version_spec: Option<String>,
    installed_version: Option<&'a str>,
}

/// One package record.
#[derive(Serialize)]
struct JsonEntry<'a> {
    package: JsonPackage<'a>,
    dependencies: Vec<JsonDependency<'a>>,
}

/// Serializes with four-space indentation.
pub(crate) fn write_pretty<W: Write, T: Serialize>(writer: &mut W, value: &T) -> io::Result<()> {
    {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut *writer, formatter);
        value
            .serialize(&mut serializer)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    }
    writeln!(writer)
}

impl Renderer for JsonRenderer {
    fn render<W: Write>(&self, graph: &DependencyGraph, _options: &RenderOptions, writer: &mut W) -> io::Result<()> {
        let entries: Vec<JsonEntry> = graph
            .nodes_sorted()
            .into_iter()
            .filter(|idx| graph.is_visible(*idx))
            .map(|idx| {
                let node = graph.node(idx);
                JsonEntry {
                    package: JsonPackage {
                        key: node.key(),
                        name: node.name(),
                        version: node.version(),
                    },
                    dependencies: graph
                        .children(idx)
                        .into_iter()
                        .map(|(child, edge)| {
                            let (name, installed_version) = child_identity(graph, edge);
                            JsonDependency {
                                key: graph.node(child).key(),
                                name,
                                version_spec: edge.requirement.version_spec(),
                                installed_version,
                            }
                        })
                        .collect(),
                }
            })
            .collect();

        write_pretty(writer, &entries)
    }
}
