//! Graphviz `dot` rendering.

use std::io::{self, Write};

use super::{Drawing, RenderOptions, Renderer};
use crate::graph::{DependencyGraph, PackageNode};

/// Graphviz `dot` renderer.
///
/// Emits a `digraph` with one node statement per package (labelled with
/// name and version) and one edge statement per requirement (labelled
/// with the constraint, or `any`). Missing packages and the edges touching
/// them are dashed. In a reversed graph edges run from dependency to
/// dependent.
pub struct GraphvizRenderer;

const KEYWORDS: [&str; 6] = ["digraph", "edge", "graph", "node", "strict", "subgraph"];

/// Quotes an ID unless it is a plain identifier that is not a keyword.
fn dot_id(id: &str) -> String {
    let plain = id.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !KEYWORDS.iter().any(|keyword| keyword.eq_ignore_ascii_case(id));
    if plain {
        id.to_string()
    } else {
        format!("\"{}\"", escape(id))
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn node_statement(node: &PackageNode) -> String {
    match node.version() {
        Some(version) => format!(
            "{} [label=\"{}\\n{}\"]",
            dot_id(node.key()),
            escape(node.name()),
            escape(version)
        ),
        None => format!(
            "{} [label=\"{}\\n(missing)\" style=dashed]",
            dot_id(node.key()),
            escape(node.name())
        ),
    }
}

impl Renderer for GraphvizRenderer {
    fn render<W: Write>(&self, graph: &DependencyGraph, options: &RenderOptions, writer: &mut W) -> io::Result<()> {
        let plan = Drawing::plan(graph, options);

        let mut nodes: Vec<String> = plan.nodes.iter().map(|idx| node_statement(graph.node(*idx))).collect();
        nodes.sort();

        let mut edges: Vec<String> = plan
            .edges
            .iter()
            .map(|(from, to, edge)| {
                let (from, to) = (graph.node(*from), graph.node(*to));
                let label = edge.requirement.version_spec().unwrap_or_else(|| "any".to_string());
                let style = if from.is_missing() || to.is_missing() {
                    " style=dashed"
                } else {
                    ""
                };
                format!(
                    "{} -> {} [label=\"{}\"{}]",
                    dot_id(from.key()),
                    dot_id(to.key()),
                    escape(&label),
                    style
                )
            })
            .collect();
        edges.sort();

        writeln!(writer, "digraph {{")?;
        for statement in nodes.iter().chain(edges.iter()) {
            writeln!(writer, "\t{}", statement)?;
        }
        writeln!(writer, "}}")
    }
}
