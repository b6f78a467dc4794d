//! Indented tree and freeze-list rendering.

use petgraph::graph::NodeIndex;
use std::io::{self, Write};

use super::{top_level, RenderOptions, Renderer};
use crate::graph::{DependencyEdge, DependencyGraph};

/// Text tree renderer.
///
/// Prints each top-level package followed by its children depth first,
/// two spaces per level. With `freeze` the lines are pip requirement
/// lines; with `unicode` branches are drawn with box-drawing characters.
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render<W: Write>(&self, graph: &DependencyGraph, options: &RenderOptions, writer: &mut W) -> io::Result<()> {
        for root in top_level(graph, options) {
            writeln!(writer, "{}", root_line(graph, root, options.freeze))?;
            let mut path = vec![root];
            render_children(graph, root, options, &mut path, "", writer)?;
        }
        Ok(())
    }
}

fn render_children<W: Write>(
    graph: &DependencyGraph,
    node: NodeIndex,
    options: &RenderOptions,
    path: &mut Vec<NodeIndex>,
    guide: &str,
    writer: &mut W,
) -> io::Result<()> {
    let depth = path.len();
    if depth > options.depth_limit() {
        return Ok(());
    }

    let children: Vec<(NodeIndex, &DependencyEdge)> = graph
        .children(node)
        .into_iter()
        // Freeze output is meant to be fed back to pip, so cycles are dropped.
        .filter(|(child, _)| !(options.freeze && path.contains(child)))
        .collect();
    let count = children.len();

    for (i, (child, edge)) in children.into_iter().enumerate() {
        let last = i + 1 == count;
        let label = child_line(graph, edge, options.freeze);
        let (lead, next_guide) = if options.freeze {
            ("  ".repeat(depth), String::new())
        } else if options.unicode {
            let (branch, rail) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };
            (format!("{}{}", guide, branch), format!("{}{}", guide, rail))
        } else {
            (format!("{}- ", "  ".repeat(depth)), String::new())
        };

        if path.contains(&child) {
            writeln!(writer, "{}{} (cycle)", lead, label)?;
            continue;
        }
        writeln!(writer, "{}{}", lead, label)?;

        path.push(child);
        render_children(graph, child, options, path, &next_guide, writer)?;
        path.pop();
    }
    Ok(())
}

fn root_line(graph: &DependencyGraph, idx: NodeIndex, freeze: bool) -> String {
    let node = graph.node(idx);
    match (node.package(), freeze) {
        (Some(pkg), true) => pkg.freeze_line(),
        (Some(pkg), false) => format!("{}=={}", pkg.name, pkg.version),
        (None, true) => node.name().to_string(),
        (None, false) => format!("{}==?", node.name()),
    }
}

fn child_line(graph: &DependencyGraph, edge: &DependencyEdge, freeze: bool) -> String {
    match (graph.is_reversed(), freeze) {
        (false, false) => edge.required_label(),
        (true, false) => edge.requires_label(),
        (false, true) => edge
            .dependency
            .as_deref()
            .map_or_else(|| edge.requirement.name.clone(), |pkg| pkg.freeze_line()),
        (true, true) => edge.dependent.freeze_line(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PackageFact;
    use crate::render::{render_to_string, OutputFormat};

    fn facts() -> Vec<PackageFact> {
        vec![
            PackageFact::new("a", "3.4.0")
                .requires("b", Some(">=2.0.0"))
                .requires("c", Some(">=5.7.1")),
            PackageFact::new("b", "2.3.1").requires("d", Some(">=2.30,<2.42")),
            PackageFact::new("c", "5.10.0")
                .requires("d", Some(">=2.30"))
                .requires("e", Some(">=0.12.1")),
            PackageFact::new("d", "2.35"),
            PackageFact::new("e", "0.12.1"),
            PackageFact::new("f", "3.1").requires("b", Some(">=2.1.0")),
            PackageFact::new("g", "6.8.3rc1")
                .requires("e", Some(">=0.9.0"))
                .requires("f", Some(">=3.0.0")),
        ]
    }

    fn text(graph: &DependencyGraph, options: RenderOptions) -> String {
        render_to_string(OutputFormat::Text, graph, &options).unwrap()
    }

    #[test]
    fn test_forward_tree() {
        let graph = DependencyGraph::from_facts(&facts());
        let expected = "\
a==3.4.0
  - b [required: >=2.0.0, installed: 2.3.1]
    - d [required: >=2.30,<2.42, installed: 2.35]
  - c [required: >=5.7.1, installed: 5.10.0]
    - d [required: >=2.30, installed: 2.35]
    - e [required: >=0.12.1, installed: 0.12.1]
g==6.8.3rc1
  - e [required: >=0.9.0, installed: 0.12.1]
  - f [required: >=3.0.0, installed: 3.1]
    - b [required: >=2.1.0, installed: 2.3.1]
      - d [required: >=2.30,<2.42, installed: 2.35]
";
        assert_eq!(text(&graph, RenderOptions::default()), expected);
    }

    #[test]
    fn test_reversed_tree() {
        let graph = DependencyGraph::from_facts(&facts()).reverse();
        let expected = "\
d==2.35
  - b==2.3.1 [requires: d>=2.30,<2.42]
    - a==3.4.0 [requires: b>=2.0.0]
    - f==3.1 [requires: b>=2.1.0]
      - g==6.8.3rc1 [requires: f>=3.0.0]
  - c==5.10.0 [requires: d>=2.30]
    - a==3.4.0 [requires: c>=5.7.1]
e==0.12.1
  - c==5.10.0 [requires: e>=0.12.1]
    - a==3.4.0 [requires: c>=5.7.1]
  - g==6.8.3rc1 [requires: e>=0.9.0]
";
        assert_eq!(text(&graph, RenderOptions::default()), expected);
    }

    #[test]
    fn test_unicode_tree() {
        let graph = DependencyGraph::from_facts(&facts()[..5]);
        let options = RenderOptions {
            unicode: true,
            ..RenderOptions::default()
        };
        let expected = "\
a==3.4.0
├── b [required: >=2.0.0, installed: 2.3.1]
│   └── d [required: >=2.30,<2.42, installed: 2.35]
└── c [required: >=5.7.1, installed: 5.10.0]
    ├── d [required: >=2.30, installed: 2.35]
    └── e [required: >=0.12.1, installed: 0.12.1]
";
        assert_eq!(text(&graph, options), expected);
    }

    #[test]
    fn test_freeze() {
        let mut facts = facts()[..5].to_vec();
        facts[4].editable = true;
        facts[4].direct_url = Some("file:///src/e".into());
        let graph = DependencyGraph::from_facts(&facts);
        let options = RenderOptions {
            freeze: true,
            ..RenderOptions::default()
        };
        let expected = "\
a==3.4.0
  b==2.3.1
    d==2.35
  c==5.10.0
    d==2.35
    -e file:///src/e
";
        assert_eq!(text(&graph, options), expected);
    }

    #[test]
    fn test_depth_limit() {
        let graph = DependencyGraph::from_facts(&[
            PackageFact::new("r", "1.0").requires("c", None),
            PackageFact::new("c", "1.0").requires("d", None),
            PackageFact::new("d", "1.0"),
        ]);
        let options = RenderOptions {
            max_depth: Some(1),
            ..RenderOptions::default()
        };
        assert_eq!(text(&graph, options), "r==1.0\n  - c [required: Any, installed: 1.0]\n");
    }

    #[test]
    fn test_cycle_marker_and_freeze_skip() {
        let graph = DependencyGraph::from_facts(&[
            PackageFact::new("a", "1.0").requires("b", Some(">=1.0")),
            PackageFact::new("b", "1.0").requires("a", Some(">=1.0")),
        ]);
        let expected = "\
a==1.0
  - b [required: >=1.0, installed: 1.0]
    - a [required: >=1.0, installed: 1.0] (cycle)
b==1.0
  - a [required: >=1.0, installed: 1.0]
    - b [required: >=1.0, installed: 1.0] (cycle)
";
        assert_eq!(text(&graph, RenderOptions::default()), expected);

        let options = RenderOptions {
            freeze: true,
            ..RenderOptions::default()
        };
        assert_eq!(text(&graph, options), "a==1.0\n  b==1.0\nb==1.0\n  a==1.0\n");
    }

    #[test]
    fn test_missing_dependency() {
        let graph = DependencyGraph::from_facts(&[PackageFact::new("a", "1.0").requires("Gone", Some("<2"))]);
        assert_eq!(
            text(&graph, RenderOptions::default()),
            "a==1.0\n  - Gone [required: <2, installed: ?]\n"
        );
        assert_eq!(
            text(&graph.reverse(), RenderOptions::default()),
            "Gone==?\n  - a==1.0 [requires: Gone<2]\n"
        );
    }

    #[test]
    fn test_list_all() {
        let graph = DependencyGraph::from_facts(&[
            PackageFact::new("a", "1.0").requires("b", None),
            PackageFact::new("b", "1.0"),
        ]);
        let options = RenderOptions {
            list_all: true,
            ..RenderOptions::default()
        };
        assert_eq!(
            text(&graph, options),
            "a==1.0\n  - b [required: Any, installed: 1.0]\nb==1.0\n"
        );
    }
}
