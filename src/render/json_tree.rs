//! Nested JSON rendering.
//!
//! Mirrors the text tree: an array of top-level packages, each carrying
//! its children recursively.

use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::io::{self, Write};

use super::json::write_pretty;
use super::{child_identity, top_level, RenderOptions, Renderer};
use crate::graph::DependencyGraph;

/// Nested JSON renderer.
pub struct JsonTreeRenderer;

/// One node of the nested document.
#[derive(Serialize)]
struct TreeNode<'a> {
    key: &'a str,
    package_name: &'a str,
    installed_version: Option<&'a str>,
    required_version: Option<String>,
    dependencies: Vec<TreeNode<'a>>,
}

impl Renderer for JsonTreeRenderer {
    fn render<W: Write>(&self, graph: &DependencyGraph, options: &RenderOptions, writer: &mut W) -> io::Result<()> {
        let tree: Vec<TreeNode> = top_level(graph, options)
            .into_iter()
            .map(|root| {
                let node = graph.node(root);
                let mut path = vec![root];
                TreeNode {
                    key: node.key(),
                    package_name: node.name(),
                    installed_version: node.version(),
                    required_version: node.version().map(str::to_string),
                    dependencies: children(graph, root, &mut path),
                }
            })
            .collect();

        write_pretty(writer, &tree)
    }
}

/// Children of `idx`; a child already on `path` is emitted without its own
/// children.
fn children<'g>(graph: &'g DependencyGraph, idx: NodeIndex, path: &mut Vec<NodeIndex>) -> Vec<TreeNode<'g>> {
    graph
        .children(idx)
        .into_iter()
        .map(|(child, edge)| {
            let (package_name, installed_version) = child_identity(graph, edge);
            let dependencies = if path.contains(&child) {
                Vec::new()
            } else {
                path.push(child);
                let nested = children(graph, child, path);
                path.pop();
                nested
            };
            TreeNode {
                key: graph.node(child).key(),
                package_name,
                installed_version,
                required_version: Some(edge.requirement.version_spec().unwrap_or_else(|| "Any".to_string())),
                dependencies,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PackageFact;
    use crate::render::{render_to_string, OutputFormat};

    fn render(graph: &DependencyGraph) -> serde_json::Value {
        let json = render_to_string(OutputFormat::JsonTree, graph, &RenderOptions::default()).unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_nested_structure() {
        let graph = DependencyGraph::from_facts(&[
            PackageFact::new("a", "1.0").requires("b", Some(">=1.0")),
            PackageFact::new("b", "1.2").requires("c", None),
            PackageFact::new("c", "0.5"),
        ]);
        let parsed = render(&graph);
        let root = &parsed[0];
        assert_eq!(root["key"], "a");
        assert_eq!(root["required_version"], "1.0");
        assert_eq!(root["dependencies"][0]["package_name"], "b");
        assert_eq!(root["dependencies"][0]["required_version"], ">=1.0");
        assert_eq!(root["dependencies"][0]["installed_version"], "1.2");
        assert_eq!(root["dependencies"][0]["dependencies"][0]["required_version"], "Any");
        assert_eq!(parsed.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_self_cycle_terminates() {
        let graph = DependencyGraph::from_facts(&[PackageFact::new("p", "1.0").requires("p", None)]);
        let parsed = render(&graph);
        assert_eq!(parsed[0]["key"], "p");
        let child = &parsed[0]["dependencies"][0];
        assert_eq!(child["key"], "p");
        assert_eq!(child["dependencies"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_missing_child_has_null_version() {
        let graph = DependencyGraph::from_facts(&[PackageFact::new("a", "1.0").requires("gone", Some(">=1"))]);
        let parsed = render(&graph);
        let child = &parsed[0]["dependencies"][0];
        assert!(child["installed_version"].is_null());
        assert_eq!(child["required_version"], ">=1");
    }
}
