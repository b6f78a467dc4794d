//! Version module for requirement evaluation.
//!
//! This module provides [`Version`] (PEP 440 style release versions) and
//! [`SpecifierSet`] (comma separated constraints such as `>=2.30,<2.42`)
//! so the graph can decide whether an installed version satisfies what a
//! dependent package declared.
//!
//! # Example
//!
//! ```rust
//! use pkgdeptree::version::{SpecifierSet, Version};
//!
//! let spec = SpecifierSet::parse(">=2.30,<2.42").unwrap();
//! assert!(spec.contains("2.35"));
//! assert!(!spec.contains("2.42"));
//!
//! assert!(Version::parse("1.0rc1").unwrap() < Version::parse("1.0").unwrap());
//! ```

mod pep440;
mod specifier;

pub use pep440::{Version, VersionError};
pub use specifier::{Operator, Specifier, SpecifierError, SpecifierSet};
