//! End-to-end pipeline from fact table to rendered output.
//!
//! [`run`] builds the graph, analyzes it, applies the requested view
//! (reversal, then filtering), and renders. Problems found by the
//! analysis come back as data in the [`Outcome`]; only configuration and
//! layout failures are errors.
//!
//! # Example
//!
//! ```rust
//! use pkgdeptree::parser::PackageFact;
//! use pkgdeptree::pipeline::{run, Options};
//!
//! let facts = vec![
//!     PackageFact::new("a", "1.0").requires("b", Some(">=1.0")),
//!     PackageFact::new("b", "1.0").requires("a", Some(">=1.0")),
//! ];
//!
//! let outcome = run(&facts, &Options::default()).unwrap();
//! assert_eq!(outcome.analysis.cycles.len(), 1);
//! assert_eq!(
//!     String::from_utf8(outcome.output).unwrap(),
//!     "a==1.0\n  - b [required: >=1.0, installed: 1.0]\n    - a [required: >=1.0, installed: 1.0] (cycle)\n\
//!      b==1.0\n  - a [required: >=1.0, installed: 1.0]\n    - b [required: >=1.0, installed: 1.0] (cycle)\n"
//! );
//! ```

use tracing::{debug, info};

use crate::analysis::Analysis;
use crate::error::Result;
use crate::graph::{filter, DependencyGraph, Diagnostic, DuplicatePolicy, FilterSpec};
use crate::parser::PackageFact;
use crate::render::{self, layout, OutputFormat, RenderOptions};

/// Everything that shapes one run.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Include/exclude patterns
    pub filter: FilterSpec,
    /// Show dependents instead of dependencies
    pub reverse: bool,
    /// Renderer settings
    pub render: RenderOptions,
    /// Output format
    pub format: OutputFormat,
    /// Graphviz output format; overrides `format` when set
    pub graph_output: Option<String>,
    /// How duplicate installs are resolved
    pub duplicate_policy: DuplicatePolicy,
}

impl Options {
    /// The renderer actually used.
    pub fn effective_format(&self) -> OutputFormat {
        if self.graph_output.is_some() {
            OutputFormat::Graphviz
        } else {
            self.format
        }
    }

    /// Warnings are only meaningful next to the human-readable tree.
    pub fn shows_warnings(&self) -> bool {
        self.effective_format() == OutputFormat::Text
    }
}

/// Result of a run.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    /// Rendered bytes, ready for stdout
    pub output: Vec<u8>,
    /// Cycles, conflicts and unsatisfied requirements of the full graph
    pub analysis: Analysis,
    /// Construction diagnostics
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs the pipeline over `facts`.
///
/// The analysis always sees the complete forward graph, whatever view is
/// rendered.
///
/// # Errors
///
/// Fails on conflicting or unmatched filter options, when Graphviz cannot
/// produce the requested format, or when rendering fails.
pub fn run(facts: &[PackageFact], options: &Options) -> Result<Outcome> {
    let graph = DependencyGraph::build(facts, options.duplicate_policy);
    info!(
        packages = graph.node_count(),
        requirements = graph.edge_count(),
        "built dependency graph"
    );

    let analysis = Analysis::of(&graph);
    let diagnostics = graph.diagnostics().to_vec();

    let view = if options.reverse { graph.reverse() } else { graph };
    let view = filter(&view, &options.filter)?;
    debug!(nodes = view.node_count(), reversed = view.is_reversed(), "prepared view");

    let format = options.effective_format();
    let mut output = Vec::new();
    render::render(format, &view, &options.render, &mut output)?;

    if let Some(image_format) = &options.graph_output {
        let source = String::from_utf8_lossy(&output).into_owned();
        output = layout::layout(&source, image_format)?;
    }

    Ok(Outcome {
        output,
        analysis,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::graph::FilterError;
    use crate::render::LayoutError;

    fn output(outcome: &Outcome) -> &str {
        std::str::from_utf8(&outcome.output).unwrap()
    }

    fn mutual() -> Vec<PackageFact> {
        vec![
            PackageFact::new("a", "1.0").requires("b", Some(">=1.0")),
            PackageFact::new("b", "1.0").requires("a", Some(">=1.0")),
        ]
    }

    #[test]
    fn test_mutual_dependency_end_to_end() {
        crate::test_support::init_test_logging();
        let facts = mutual();

        let outcome = run(&facts, &Options::default()).unwrap();
        assert_eq!(outcome.analysis.cycles.len(), 1);
        assert_eq!(outcome.analysis.cycles[0].cycle_path(), "a => b => a");

        let json = run(
            &facts,
            &Options {
                format: OutputFormat::Json,
                ..Options::default()
            },
        )
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&json.output).unwrap();
        assert_eq!(parsed[0]["dependencies"][0]["key"], "b");
        assert_eq!(parsed[1]["dependencies"][0]["key"], "a");

        let reversed = run(
            &facts,
            &Options {
                reverse: true,
                ..Options::default()
            },
        )
        .unwrap();
        let text = output(&reversed);
        assert!(text.starts_with("a==1.0\n"));
        assert!(text.contains("\nb==1.0\n"));
    }

    #[test]
    fn test_reverse_then_filter() {
        let facts = vec![
            PackageFact::new("app", "1.0").requires("lib", Some(">=2")),
            PackageFact::new("tool", "0.3").requires("lib", None),
            PackageFact::new("lib", "2.1"),
        ];
        let outcome = run(
            &facts,
            &Options {
                reverse: true,
                filter: FilterSpec::include(["lib"]),
                ..Options::default()
            },
        )
        .unwrap();
        assert_eq!(
            output(&outcome),
            "lib==2.1\n  - app==1.0 [requires: lib>=2]\n  - tool==0.3 [requires: lib]\n"
        );
    }

    #[test]
    fn test_analysis_ignores_filter() {
        let facts = vec![
            PackageFact::new("a", "1.0").requires("x", Some(">=2.0")),
            PackageFact::new("b", "1.0").requires("x", Some("<2.0")),
            PackageFact::new("x", "2.5"),
        ];
        let outcome = run(
            &facts,
            &Options {
                filter: FilterSpec::exclude(["b"]),
                ..Options::default()
            },
        )
        .unwrap();
        assert_eq!(outcome.analysis.conflicts.len(), 1);
        assert!(!output(&outcome).contains("b=="));
    }

    #[test]
    fn test_filter_error_is_returned() {
        let err = run(
            &mutual(),
            &Options {
                filter: FilterSpec::include(["nothing"]),
                ..Options::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::Filter(FilterError::NoMatch { .. })));
    }

    #[test]
    fn test_duplicates_reported() {
        let facts = vec![PackageFact::new("six", "1.16.0"), PackageFact::new("Six", "1.15.0")];
        let outcome = run(&facts, &Options::default()).unwrap();
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(output(&outcome), "six==1.16.0\n");
    }

    #[test]
    fn test_graph_output_dot_passthrough() {
        let options = Options {
            graph_output: Some("dot".to_string()),
            ..Options::default()
        };
        assert!(!options.shows_warnings());
        let outcome = run(&mutual(), &options).unwrap();
        assert!(output(&outcome).starts_with("digraph {\n"));
    }

    #[test]
    fn test_graph_output_unsupported() {
        let err = run(
            &mutual(),
            &Options {
                graph_output: Some("docx".to_string()),
                ..Options::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::Layout(LayoutError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_warnings_only_for_text() {
        assert!(Options::default().shows_warnings());
        let json = Options {
            format: OutputFormat::Json,
            ..Options::default()
        };
        assert!(!json.shows_warnings());
    }
}
