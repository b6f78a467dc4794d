//! Structural analysis of the dependency graph.
//!
//! This module detects problems in an installed environment and returns
//! them as data, leaving it to the caller whether they are printed or
//! turned into a failing exit status.
//!
//! # Features
//!
//! - Find dependency cycles (including self-loops)
//! - Find packages whose dependents require incompatible versions
//! - Find requirements that are missing or not satisfied by what is installed
//!
//! # Example
//!
//! ```rust
//! use pkgdeptree::analysis::Analysis;
//! use pkgdeptree::graph::DependencyGraph;
//! use pkgdeptree::parser::PackageFact;
//!
//! let graph = DependencyGraph::from_facts(&[
//!     PackageFact::new("a", "1.0").requires("b", Some(">=1.0")),
//!     PackageFact::new("b", "1.0").requires("a", Some(">=1.0")),
//! ]);
//!
//! let analysis = Analysis::of(&graph);
//! assert_eq!(analysis.cycles.len(), 1);
//! assert!(analysis.conflicts.is_empty());
//! assert!(analysis.has_warnings());
//! ```

pub mod conflicts;
pub mod cycles;

use std::fmt::Write as _;
use tracing::info;

use crate::graph::DependencyGraph;

pub use conflicts::{find_conflicts, find_unsatisfied, Conflict, Requirer, Unsatisfied};
pub use cycles::{find_cycles, Cycle};

const SEPARATOR_WIDTH: usize = 72;

/// Everything the analysis found in one graph.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Dependency cycles
    pub cycles: Vec<Cycle>,
    /// Incompatible version constraints
    pub conflicts: Vec<Conflict>,
    /// Missing or unsatisfied requirements
    pub unsatisfied: Vec<Unsatisfied>,
}

impl Analysis {
    /// Runs every detector on the graph.
    pub fn of(graph: &DependencyGraph) -> Self {
        let analysis = Self {
            cycles: find_cycles(graph),
            conflicts: find_conflicts(graph),
            unsatisfied: find_unsatisfied(graph),
        };
        info!(
            cycles = analysis.cycles.len(),
            conflicts = analysis.conflicts.len(),
            unsatisfied = analysis.unsatisfied.len(),
            "analyzed dependency graph"
        );
        analysis
    }

    /// True when any detector found something.
    pub fn has_warnings(&self) -> bool {
        !(self.cycles.is_empty() && self.conflicts.is_empty() && self.unsatisfied.is_empty())
    }

    /// Renders the warning report shown before text output.
    ///
    /// Each non-empty section is followed by a separator line. Returns an
    /// empty string when there is nothing to report.
    pub fn render_warnings(&self) -> String {
        let mut out = String::new();
        let separator = "-".repeat(SEPARATOR_WIDTH);

        if !self.unsatisfied.is_empty() {
            out.push_str("Warning!!! Possibly conflicting dependencies found:\n");
            for entry in &self.unsatisfied {
                let _ = writeln!(out, "* {}=={}", entry.dependent.name, entry.dependent.version);
                for edge in &entry.requirements {
                    let _ = writeln!(out, " - {}", edge.required_label());
                }
            }
            let _ = writeln!(out, "{}", separator);
        }

        if !self.conflicts.is_empty() {
            out.push_str("Warning!!! Conflicting version requirements found:\n");
            for conflict in &self.conflicts {
                let _ = writeln!(out, "* {}=={}", conflict.name, conflict.installed_version);
                for requirer in &conflict.requirers {
                    let _ = writeln!(out, " - {} requires {}", requirer.name, requirer.version_spec);
                }
            }
            let _ = writeln!(out, "{}", separator);
        }

        if !self.cycles.is_empty() {
            out.push_str("Warning!! Cyclic dependencies found:\n");
            for cycle in &self.cycles {
                let _ = writeln!(out, "* {}", cycle.cycle_path());
            }
            let _ = writeln!(out, "{}", separator);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PackageFact;

    #[test]
    fn test_clean_graph_has_no_warnings() {
        let graph = DependencyGraph::from_facts(&[
            PackageFact::new("a", "1.0").requires("b", Some(">=1.0")),
            PackageFact::new("b", "1.2"),
        ]);
        let analysis = Analysis::of(&graph);
        assert!(!analysis.has_warnings());
        assert_eq!(analysis.render_warnings(), "");
    }

    #[test]
    fn test_render_warnings() {
        let graph = DependencyGraph::from_facts(&[
            PackageFact::new("a", "1.0")
                .requires("b", Some(">=1.0"))
                .requires("x", Some(">=2.0")),
            PackageFact::new("b", "1.0")
                .requires("a", None)
                .requires("x", Some("<2.0")),
            PackageFact::new("x", "2.5"),
        ]);
        let report = Analysis::of(&graph).render_warnings();
        let separator = "-".repeat(72);
        let expected = format!(
            "Warning!!! Possibly conflicting dependencies found:\n\
             * b==1.0\n \
             - x [required: <2.0, installed: 2.5]\n\
             {separator}\n\
             Warning!!! Conflicting version requirements found:\n\
             * x==2.5\n \
             - a requires >=2.0\n \
             - b requires <2.0\n\
             {separator}\n\
             Warning!! Cyclic dependencies found:\n\
             * a => b => a\n\
             {separator}\n"
        );
        assert_eq!(report, expected);
    }
}
