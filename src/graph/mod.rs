//! Graph module for dependency relationship modeling.
//!
//! This module provides the [`DependencyGraph`] struct, built from the
//! package fact table, and the pure transforms over it: reversal,
//! include/exclude filtering and top-level selection.
//!
//! # Example
//!
//! ```rust
//! use pkgdeptree::graph::{filter, DependencyGraph, FilterSpec};
//! use pkgdeptree::parser::PackageFact;
//!
//! let graph = DependencyGraph::from_facts(&[
//!     PackageFact::new("flask", "3.0.0").requires("werkzeug", Some(">=3.0.0")),
//!     PackageFact::new("werkzeug", "3.0.1").requires("markupsafe", Some(">=2.1.1")),
//!     PackageFact::new("markupsafe", "2.1.3"),
//! ]);
//!
//! assert_eq!(graph.node_count(), 3);
//! assert_eq!(graph.edge_count(), 2);
//!
//! let reversed = graph.reverse();
//! assert_eq!(reversed.root_keys(), vec!["markupsafe"]);
//!
//! let filtered = filter(&graph, &FilterSpec::exclude(["werkzeug"])).unwrap();
//! assert_eq!(filtered.node_count(), 2);
//! ```

mod dependency_graph;
mod filter;
mod package;

pub use dependency_graph::{DependencyGraph, DuplicatePolicy};
pub use filter::{filter, FilterError, FilterSpec, NamePattern};
pub use package::{normalize_name, DependencyEdge, Diagnostic, Package, PackageNode, Requirement};
pub use petgraph::graph::NodeIndex;
