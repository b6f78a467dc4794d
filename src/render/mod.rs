//! Rendering of dependency graphs.
//!
//! This module provides renderers that turn a (possibly filtered or
//! reversed) [`DependencyGraph`] into text trees, freeze lists, flat and
//! nested JSON, Graphviz `dot` and Mermaid flowcharts. Every renderer is
//! deterministic: traversals are sorted by package key so equal graphs
//! always produce identical bytes.
//!
//! # Example
//!
//! ```rust
//! use pkgdeptree::graph::DependencyGraph;
//! use pkgdeptree::parser::PackageFact;
//! use pkgdeptree::render::{render_to_string, OutputFormat, RenderOptions};
//!
//! let graph = DependencyGraph::from_facts(&[
//!     PackageFact::new("a", "1.0").requires("b", Some(">=2.0")),
//!     PackageFact::new("b", "2.3"),
//! ]);
//!
//! let text = render_to_string(OutputFormat::Text, &graph, &RenderOptions::default()).unwrap();
//! assert_eq!(text, "a==1.0\n  - b [required: >=2.0, installed: 2.3]\n");
//! ```

pub mod graphviz;
pub mod json;
pub mod json_tree;
pub mod layout;
pub mod mermaid;
pub mod text;

use petgraph::graph::NodeIndex;
use std::collections::{HashMap, VecDeque};
use std::io::{self, Write};

use crate::graph::{DependencyEdge, DependencyGraph};

pub use layout::{LayoutEngine, LayoutError};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Indented tree (or freeze list) - human-readable
    #[default]
    Text,
    /// Flat JSON - one record per package
    Json,
    /// Nested JSON - same shape as the text tree
    JsonTree,
    /// Graphviz dot source
    Graphviz,
    /// Mermaid flowchart
    Mermaid,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "tree" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "json-tree" | "json_tree" => Ok(OutputFormat::JsonTree),
            "dot" | "graphviz" => Ok(OutputFormat::Graphviz),
            "mermaid" => Ok(OutputFormat::Mermaid),
            _ => Err(format!(
                "Unknown output format: '{}'. Valid formats: text, json, json-tree, dot, mermaid",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::JsonTree => write!(f, "json-tree"),
            OutputFormat::Graphviz => write!(f, "dot"),
            OutputFormat::Mermaid => write!(f, "mermaid"),
        }
    }
}

/// Options shared by every renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Maximum tree depth; `None` or `Some(0)` means unlimited
    pub max_depth: Option<usize>,
    /// Print pip requirement lines instead of annotated ones (text only)
    pub freeze: bool,
    /// Show every package at the top level
    pub list_all: bool,
    /// Draw branches with box-drawing characters (text only)
    pub unicode: bool,
}

impl RenderOptions {
    /// Depth limit with "unlimited" mapped to `usize::MAX`.
    pub fn depth_limit(&self) -> usize {
        self.max_depth.filter(|depth| *depth > 0).unwrap_or(usize::MAX)
    }

    /// True when a depth limit applies.
    pub fn is_depth_limited(&self) -> bool {
        self.depth_limit() != usize::MAX
    }
}

/// Trait for renderers.
pub trait Renderer {
    /// Render the graph to the given writer.
    fn render<W: Write>(&self, graph: &DependencyGraph, options: &RenderOptions, writer: &mut W) -> io::Result<()>;
}

/// Render a graph in the specified format.
pub fn render<W: Write>(
    format: OutputFormat,
    graph: &DependencyGraph,
    options: &RenderOptions,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => text::TextRenderer.render(graph, options, writer),
        OutputFormat::Json => json::JsonRenderer.render(graph, options, writer),
        OutputFormat::JsonTree => json_tree::JsonTreeRenderer.render(graph, options, writer),
        OutputFormat::Graphviz => graphviz::GraphvizRenderer.render(graph, options, writer),
        OutputFormat::Mermaid => mermaid::MermaidRenderer.render(graph, options, writer),
    }
}

/// Render a graph to a string.
pub fn render_to_string(format: OutputFormat, graph: &DependencyGraph, options: &RenderOptions) -> io::Result<String> {
    let mut buffer = Vec::new();
    render(format, graph, options, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Nodes printed at the top level: every visible node with `list_all`,
/// otherwise the graph roots.
pub(crate) fn top_level(graph: &DependencyGraph, options: &RenderOptions) -> Vec<NodeIndex> {
    if options.list_all {
        graph
            .nodes_sorted()
            .into_iter()
            .filter(|idx| graph.is_visible(*idx))
            .collect()
    } else {
        graph.roots()
    }
}

/// Display name and version of the node an edge leads to.
///
/// In the forward view that is the resolved dependency; in the reversed
/// view it is the dependent package.
pub(crate) fn child_identity<'a>(graph: &DependencyGraph, edge: &'a DependencyEdge) -> (&'a str, Option<&'a str>) {
    if graph.is_reversed() {
        (edge.dependent.name.as_str(), Some(edge.dependent.version.as_str()))
    } else {
        (edge.target_name(), edge.installed_version())
    }
}

/// Breadth-first depth of every node within `max_depth` of the top level.
pub(crate) fn depths_from(graph: &DependencyGraph, starts: &[NodeIndex], max_depth: usize) -> HashMap<NodeIndex, usize> {
    let mut depths = HashMap::new();
    let mut queue: VecDeque<(NodeIndex, usize)> = starts.iter().map(|idx| (*idx, 0)).collect();
    while let Some((idx, depth)) = queue.pop_front() {
        if depths.contains_key(&idx) {
            continue;
        }
        depths.insert(idx, depth);
        if depth < max_depth {
            for (child, _) in graph.children(idx) {
                if !depths.contains_key(&child) {
                    queue.push_back((child, depth + 1));
                }
            }
        }
    }
    depths
}

/// Nodes and edges a graph-description renderer should draw.
///
/// Without a depth limit that is the whole graph. With one, nodes are
/// drawn up to the limit and edges only leave nodes above it.
pub(crate) struct Drawing<'g> {
    pub nodes: Vec<NodeIndex>,
    pub edges: Vec<(NodeIndex, NodeIndex, &'g DependencyEdge)>,
}

impl<'g> Drawing<'g> {
    pub(crate) fn plan(graph: &'g DependencyGraph, options: &RenderOptions) -> Self {
        let all = graph.nodes_sorted();
        let limit = options.depth_limit();
        let depths = options
            .is_depth_limited()
            .then(|| depths_from(graph, &top_level(graph, options), limit));

        let nodes: Vec<NodeIndex> = match &depths {
            Some(depths) => all.into_iter().filter(|idx| depths.contains_key(idx)).collect(),
            None => all,
        };
        let mut edges = Vec::new();
        for &from in &nodes {
            if let Some(depths) = &depths {
                if depths.get(&from).map_or(true, |depth| *depth >= limit) {
                    continue;
                }
            }
            for (to, edge) in graph.children(from) {
                if depths.as_ref().map_or(true, |depths| depths.contains_key(&to)) {
                    edges.push((from, to, edge));
                }
            }
        }
        Self { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PackageFact;

    fn chain() -> DependencyGraph {
        DependencyGraph::from_facts(&[
            PackageFact::new("r", "1.0").requires("c", None),
            PackageFact::new("c", "1.0").requires("d", None),
            PackageFact::new("d", "1.0"),
        ])
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("json-tree".parse::<OutputFormat>().unwrap(), OutputFormat::JsonTree);
        assert_eq!("dot".parse::<OutputFormat>().unwrap(), OutputFormat::Graphviz);
        assert_eq!("mermaid".parse::<OutputFormat>().unwrap(), OutputFormat::Mermaid);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(format!("{}", OutputFormat::JsonTree), "json-tree");
        assert_eq!(format!("{}", OutputFormat::Graphviz), "dot");
    }

    #[test]
    fn test_depth_limit() {
        assert_eq!(RenderOptions::default().depth_limit(), usize::MAX);
        let zero = RenderOptions {
            max_depth: Some(0),
            ..RenderOptions::default()
        };
        assert!(!zero.is_depth_limited());
    }

    #[test]
    fn test_drawing_plan_with_depth() {
        let graph = chain();
        let options = RenderOptions {
            max_depth: Some(1),
            ..RenderOptions::default()
        };
        let plan = Drawing::plan(&graph, &options);
        let keys: Vec<&str> = plan.nodes.iter().map(|idx| graph.node(*idx).key()).collect();
        assert_eq!(keys, vec!["c", "r"]);
        assert_eq!(plan.edges.len(), 1);

        let full = Drawing::plan(&graph, &RenderOptions::default());
        assert_eq!(full.nodes.len(), 3);
        assert_eq!(full.edges.len(), 2);
    }

    #[test]
    fn test_renderers_independent_of_fact_order() {
        let facts = vec![
            PackageFact::new("a", "1.0")
                .requires("b", Some(">=1"))
                .requires("c", None),
            PackageFact::new("b", "1.0").requires("c", Some("<2")),
            PackageFact::new("c", "1.5").requires("gone", None),
        ];
        let mut shuffled = facts.clone();
        shuffled.rotate_left(1);

        let first = DependencyGraph::from_facts(&facts);
        let second = DependencyGraph::from_facts(&shuffled);
        for format in [
            OutputFormat::Text,
            OutputFormat::Json,
            OutputFormat::JsonTree,
            OutputFormat::Graphviz,
            OutputFormat::Mermaid,
        ] {
            let options = RenderOptions::default();
            assert_eq!(
                render_to_string(format, &first, &options).unwrap(),
                render_to_string(format, &second, &options).unwrap(),
                "{format}"
            );
        }
    }
}
