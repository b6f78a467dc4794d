//! pkgdeptree - dependency trees of installed packages
//!
//! This crate reads a fact table describing the packages installed in an
//! environment (name, version, declared requirements), reconstructs the
//! dependency graph between them, and renders it as an indented tree,
//! freeze-style requirement lines, flat or nested JSON, Graphviz `dot`
//! or a Mermaid flowchart. It also reports dependency cycles, conflicting
//! version constraints and requirements the environment does not satisfy.
//!
//! # Example
//!
//! ```rust
//! use pkgdeptree::parser::parse_str;
//! use pkgdeptree::pipeline::{run, Options};
//!
//! let facts = parse_str(r#"[
//!     {"name": "requests", "version": "2.31.0", "requirements": ["urllib3<3,>=1.21.1"]},
//!     {"name": "urllib3", "version": "2.0.7"}
//! ]"#).unwrap();
//!
//! let outcome = run(&facts, &Options::default()).unwrap();
//! assert!(!outcome.analysis.has_warnings());
//! assert_eq!(
//!     String::from_utf8(outcome.output).unwrap(),
//!     "requests==2.31.0\n  - urllib3 [required: >=1.21.1,<3, installed: 2.0.7]\n"
//! );
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod graph;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod version;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Error, Result};
