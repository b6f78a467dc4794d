//! Parser module for package fact tables.
//!
//! The environment inspector that discovers installed packages lives
//! outside this crate; it hands over a JSON document listing every
//! installed distribution and the requirements it declares. This module
//! reads that document.
//!
//! # Example
//!
//! ```
//! use pkgdeptree::parser::parse_str;
//!
//! let facts = parse_str(r#"[
//!     {"name": "flask", "version": "3.0.0", "requirements": ["werkzeug>=3.0.0", "click>=8.1.3"]},
//!     {"name": "werkzeug", "version": "3.0.1"}
//! ]"#).unwrap();
//!
//! assert_eq!(facts.len(), 2);
//! assert_eq!(facts[0].requirements.len(), 2);
//! ```

pub mod facts;
pub mod requirement;
pub mod types;

pub use facts::{parse_file, parse_reader, parse_str, FactsError, FactsResult};
pub use requirement::{parse_requirement, RequirementSyntaxError};
pub use types::{DeclaredRequirement, PackageFact, RequirementFact};
