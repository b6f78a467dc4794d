//! Shared types for the package fact table.
//!
//! These structures mirror the JSON document produced by the external
//! environment inspector: one entry per installed distribution with the
//! requirements it declares.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::requirement::{parse_requirement, RequirementSyntaxError};

/// One installed package as reported by the environment inspector.
///
/// # Example
///
/// ```rust
/// use pkgdeptree::parser::PackageFact;
///
/// let json = r#"{"name": "Flask", "version": "3.0.0", "requirements": ["Werkzeug>=3.0.0"]}"#;
/// let fact: PackageFact = serde_json::from_str(json).unwrap();
/// assert_eq!(fact.name, "Flask");
/// assert_eq!(fact.requirements.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageFact {
    /// The distribution name as published (e.g. "Flask", "zope.interface").
    pub name: String,

    /// The installed version string.
    pub version: String,

    /// Requirements declared by the package, in declaration order.
    #[serde(default, alias = "requires")]
    pub requirements: Vec<RequirementFact>,

    /// Whether the package is an editable (development) install.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub editable: bool,

    /// URL the package was installed from, when not from an index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_url: Option<String>,
}

impl PackageFact {
    /// Creates a fact with no requirements.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            requirements: Vec::new(),
            editable: false,
            direct_url: None,
        }
    }

    /// Adds a requirement on `name` with an optional constraint.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pkgdeptree::parser::PackageFact;
    ///
    /// let fact = PackageFact::new("a", "1.0")
    ///     .requires("b", Some(">=1.0"))
    ///     .requires("c", None);
    /// assert_eq!(fact.requirements.len(), 2);
    /// ```
    pub fn requires(mut self, name: impl Into<String>, constraint: Option<&str>) -> Self {
        self.requirements.push(RequirementFact::Detailed {
            name: name.into(),
            constraint: constraint.map(str::to_string),
            marker: None,
        });
        self
    }
}

/// A declared requirement, either as a PEP 508 string or as an object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RequirementFact {
    /// Raw requirement line, e.g. `"requests[socks]>=2.0; python_version>'3.8'"`.
    Line(String),

    /// Pre-split requirement.
    Detailed {
        /// Target package name
        name: String,
        /// Version constraint, absent when unconstrained
        #[serde(default)]
        constraint: Option<String>,
        /// Environment marker
        #[serde(default)]
        marker: Option<String>,
    },
}

impl RequirementFact {
    /// Resolves either form into name, constraint and marker.
    pub fn declared(&self) -> Result<DeclaredRequirement, RequirementSyntaxError> {
        match self {
            Self::Line(line) => parse_requirement(line),
            Self::Detailed {
                name,
                constraint,
                marker,
            } => {
                if name.trim().is_empty() {
                    return Err(RequirementSyntaxError::MissingName(name.clone()));
                }
                Ok(DeclaredRequirement {
                    name: name.trim().to_string(),
                    constraint: constraint
                        .as_deref()
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(str::to_string),
                    marker: marker.clone(),
                })
            }
        }
    }
}

impl fmt::Display for RequirementFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(line) => write!(f, "{}", line),
            Self::Detailed {
                name, constraint, ..
            } => write!(f, "{}{}", name, constraint.as_deref().unwrap_or_default()),
        }
    }
}

/// A requirement split into its parts, before version parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredRequirement {
    /// Target name as written.
    pub name: String,
    /// Raw constraint text (`>=1.0,<2`), if any.
    pub constraint: Option<String>,
    /// Environment marker text, if any.
    pub marker: Option<String>,
}

impl DeclaredRequirement {
    /// True when the marker restricts the requirement to an optional extra.
    ///
    /// Such requirements only apply when the extra was requested, so they
    /// do not describe an installed relationship.
    pub fn is_extra_only(&self) -> bool {
        self.marker.as_deref().is_some_and(|marker| {
            marker.match_indices("extra").any(|(pos, _)| {
                let before_ok = marker[..pos]
                    .chars()
                    .next_back()
                    .map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
                let after = marker[pos + "extra".len()..].trim_start();
                before_ok && after.starts_with("==")
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_builder() {
        let fact = PackageFact::new("a", "1.0").requires("b", Some(">=1.0"));
        assert_eq!(fact.name, "a");
        assert_eq!(fact.version, "1.0");
        assert_eq!(
            fact.requirements,
            vec![RequirementFact::Detailed {
                name: "b".into(),
                constraint: Some(">=1.0".into()),
                marker: None
            }]
        );
    }

    #[test]
    fn test_deserialize_both_requirement_forms() {
        let json = r#"{
            "name": "a",
            "version": "1.0",
            "requires": ["b>=2", {"name": "c", "constraint": "<3"}, {"name": "d"}]
        }"#;
        let fact: PackageFact = serde_json::from_str(json).unwrap();
        let declared: Vec<DeclaredRequirement> = fact
            .requirements
            .iter()
            .map(|r| r.declared().unwrap())
            .collect();

        assert_eq!(declared[0].name, "b");
        assert_eq!(declared[0].constraint.as_deref(), Some(">=2"));
        assert_eq!(declared[1].constraint.as_deref(), Some("<3"));
        assert_eq!(declared[2].constraint, None);
        assert!(!fact.editable);
    }

    #[test]
    fn test_blank_constraint_is_unconstrained() {
        let req = RequirementFact::Detailed {
            name: "x".into(),
            constraint: Some("  ".into()),
            marker: None,
        };
        assert_eq!(req.declared().unwrap().constraint, None);
    }

    #[test]
    fn test_missing_name_is_error() {
        let req = RequirementFact::Detailed {
            name: " ".into(),
            constraint: None,
            marker: None,
        };
        assert!(req.declared().is_err());
    }

    #[test]
    fn test_is_extra_only() {
        let with_marker = |marker: &str| DeclaredRequirement {
            name: "x".into(),
            constraint: None,
            marker: Some(marker.into()),
        };
        assert!(with_marker("extra == 'socks'").is_extra_only());
        assert!(with_marker("python_version >= '3.8' and extra=='test'").is_extra_only());
        assert!(!with_marker("python_version >= '3.8'").is_extra_only());
        assert!(!with_marker("myextra == 'x'").is_extra_only());
    }

    #[test]
    fn test_requirement_display() {
        let req = RequirementFact::Detailed {
            name: "b".into(),
            constraint: Some(">=1".into()),
            marker: None,
        };
        assert_eq!(req.to_string(), "b>=1");
        assert_eq!(RequirementFact::Line("c<2".into()).to_string(), "c<2");
    }
}
