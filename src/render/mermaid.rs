//! Mermaid flowchart rendering.

use std::collections::{BTreeSet, HashMap};
use std::io::{self, Write};

use super::{Drawing, RenderOptions, Renderer};
use crate::graph::DependencyGraph;

/// Mermaid flowchart renderer.
pub struct MermaidRenderer;

/// Words Mermaid does not accept as node IDs.
const RESERVED_IDS: [&str; 20] = [
    "C4Component",
    "C4Container",
    "C4Deployment",
    "C4Dynamic",
    "_blank",
    "_parent",
    "_self",
    "_top",
    "call",
    "class",
    "classDef",
    "click",
    "end",
    "flowchart",
    "flowchart-v2",
    "graph",
    "interpolate",
    "linkStyle",
    "style",
    "subgraph",
];

const INDENT: &str = "    ";

/// Assigns stable node IDs, suffixing reserved words with `_N`.
#[derive(Default)]
struct NodeIds {
    ids: HashMap<String, String>,
    taken: BTreeSet<String>,
}

impl NodeIds {
    fn id(&mut self, key: &str) -> String {
        if let Some(id) = self.ids.get(key) {
            return id.clone();
        }
        let id = if RESERVED_IDS.contains(&key) {
            (0..)
                .map(|n| format!("{}_{}", key, n))
                .find(|candidate| !self.taken.contains(candidate))
                .unwrap_or_else(|| key.to_string())
        } else {
            key.to_string()
        };
        self.taken.insert(id.clone());
        self.ids.insert(key.to_string(), id.clone());
        id
    }
}

impl Renderer for MermaidRenderer {
    fn render<W: Write>(&self, graph: &DependencyGraph, options: &RenderOptions, writer: &mut W) -> io::Result<()> {
        let plan = Drawing::plan(graph, options);
        let mut ids = NodeIds::default();
        // Claim plain keys first so a suffixed ID never shadows a real package.
        for idx in &plan.nodes {
            let key = graph.node(*idx).key();
            if !RESERVED_IDS.contains(&key) {
                ids.id(key);
            }
        }

        let nodes: BTreeSet<String> = plan
            .nodes
            .iter()
            .map(|idx| {
                let node = graph.node(*idx);
                let id = ids.id(node.key());
                match node.version() {
                    Some(version) => format!("{}[\"{}\\n{}\"]", id, node.name(), version),
                    None => format!("{}[\"{}\\n(missing)\"]:::missing", id, node.name()),
                }
            })
            .collect();

        let edges: BTreeSet<String> = plan
            .edges
            .iter()
            .map(|(from, to, edge)| {
                let (from, to) = (graph.node(*from), graph.node(*to));
                let (from_id, to_id) = (ids.id(from.key()), ids.id(to.key()));
                if from.is_missing() || to.is_missing() {
                    format!("{} -.-> {}", from_id, to_id)
                } else {
                    let label = edge.requirement.version_spec().unwrap_or_else(|| "any".to_string());
                    format!("{} -- \"{}\" --> {}", from_id, label, to_id)
                }
            })
            .collect();

        writeln!(writer, "flowchart TD")?;
        writeln!(writer, "{}classDef missing stroke-dasharray: 5", INDENT)?;
        for line in nodes.iter().chain(edges.iter()) {
            writeln!(writer, "{}{}", INDENT, line)?;
        }
        Ok(())
    }
}
