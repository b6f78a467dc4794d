//! Node and edge records shared by every view of the dependency graph.
//!
//! Records are reference counted so reversal and filtering can build new
//! graphs without copying package or requirement data.

use std::fmt;
use std::sync::Arc;

use crate::parser::{DeclaredRequirement, PackageFact};
use crate::version::{SpecifierError, SpecifierSet};

/// Normalizes a package name into its lookup key.
///
/// Lower-cases the name and collapses runs of `-`, `_` and `.` into a
/// single `-`.
///
/// # Example
///
/// ```rust
/// use pkgdeptree::graph::normalize_name;
///
/// assert_eq!(normalize_name("Zope.Interface"), "zope-interface");
/// assert_eq!(normalize_name("typing__extensions"), "typing-extensions");
/// ```
pub fn normalize_name(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                key.push('-');
            }
            in_separator = true;
        } else {
            key.extend(c.to_lowercase());
            in_separator = false;
        }
    }
    key
}

/// An installed package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Normalized lookup key
    pub key: String,
    /// Name as published
    pub name: String,
    /// Installed version string
    pub version: String,
    /// Editable (development) install
    pub editable: bool,
    /// Source URL for direct or editable installs
    pub direct_url: Option<String>,
}

impl Package {
    /// Creates a package installed from an index.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: normalize_name(&name),
            name,
            version: version.into(),
            editable: false,
            direct_url: None,
        }
    }

    /// Creates a package record from a fact table entry.
    pub fn from_fact(fact: &PackageFact) -> Self {
        Self {
            editable: fact.editable,
            direct_url: fact.direct_url.clone(),
            ..Self::new(fact.name.trim(), fact.version.trim())
        }
    }

    /// Renders the package as a pip requirement line.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pkgdeptree::graph::Package;
    ///
    /// let pkg = Package::new("Flask", "3.0.0");
    /// assert_eq!(pkg.freeze_line(), "Flask==3.0.0");
    /// ```
    pub fn freeze_line(&self) -> String {
        match (&self.direct_url, self.editable) {
            (Some(url), true) => format!("-e {}", url),
            (Some(url), false) => format!("{} @ {}", self.name, url),
            (None, _) => format!("{}=={}", self.name, self.version),
        }
    }
}

/// A requirement declared by one package on another.
#[derive(Debug, Clone)]
pub struct Requirement {
    /// Normalized key of the target
    pub key: String,
    /// Target name as declared
    pub name: String,
    /// Parsed constraint; empty means any version
    pub specifier: SpecifierSet,
    /// Constraint text as declared
    pub raw_constraint: Option<String>,
    /// Environment marker, if any
    pub marker: Option<String>,
}

impl Requirement {
    /// Creates a requirement from its declared parts.
    ///
    /// A constraint that does not parse yields an unconstrained requirement
    /// alongside the parse error so the caller can report it.
    pub fn from_declared(declared: DeclaredRequirement) -> (Self, Option<SpecifierError>) {
        let (specifier, error) = match declared.constraint.as_deref().map(SpecifierSet::parse) {
            Some(Ok(set)) => (set, None),
            Some(Err(e)) => (SpecifierSet::default(), Some(e)),
            None => (SpecifierSet::default(), None),
        };
        let requirement = Self {
            key: normalize_name(&declared.name),
            name: declared.name,
            specifier,
            raw_constraint: declared.constraint,
            marker: declared.marker,
        };
        (requirement, error)
    }

    /// Canonical constraint text (`>=2.30,<2.42`), or `None` for "any".
    pub fn version_spec(&self) -> Option<String> {
        (!self.specifier.is_empty()).then(|| self.specifier.to_string())
    }

    /// Whether the given installed version satisfies the constraint.
    pub fn is_satisfied_by(&self, version: &str) -> bool {
        self.specifier.contains(version)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.specifier)
    }
}

/// A node weight: an installed package or a placeholder for an absent one.
#[derive(Debug, Clone)]
pub enum PackageNode {
    /// A package present in the fact table.
    Installed(Arc<Package>),
    /// A required package that is not installed.
    Missing {
        /// Normalized key
        key: String,
        /// Name as first declared by a dependent
        name: String,
    },
}

impl PackageNode {
    /// Normalized key of the node.
    pub fn key(&self) -> &str {
        match self {
            Self::Installed(pkg) => &pkg.key,
            Self::Missing { key, .. } => key,
        }
    }

    /// Display name of the node.
    pub fn name(&self) -> &str {
        match self {
            Self::Installed(pkg) => &pkg.name,
            Self::Missing { name, .. } => name,
        }
    }

    /// Installed version, `None` for missing packages.
    pub fn version(&self) -> Option<&str> {
        self.package().map(|pkg| pkg.version.as_str())
    }

    /// The installed package record, if any.
    pub fn package(&self) -> Option<&Arc<Package>> {
        match self {
            Self::Installed(pkg) => Some(pkg),
            Self::Missing { .. } => None,
        }
    }

    /// True for placeholder nodes.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

/// An edge weight describing one declared dependency.
///
/// The weight does not depend on the edge direction, so a reversed graph
/// carries exactly the same records as the forward one.
#[derive(Debug, Clone)]
pub struct DependencyEdge {
    /// The package that declared the requirement
    pub dependent: Arc<Package>,
    /// The declared requirement
    pub requirement: Arc<Requirement>,
    /// The installed package the requirement resolved to
    pub dependency: Option<Arc<Package>>,
}

impl DependencyEdge {
    /// Installed version of the resolved target.
    pub fn installed_version(&self) -> Option<&str> {
        self.dependency.as_deref().map(|pkg| pkg.version.as_str())
    }

    /// Display name of the target: as installed, else as declared.
    pub fn target_name(&self) -> &str {
        self.dependency
            .as_deref()
            .map_or(self.requirement.name.as_str(), |pkg| pkg.name.as_str())
    }

    /// Describes the edge from the dependent's side.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use pkgdeptree::graph::{DependencyEdge, Package, Requirement};
    /// use pkgdeptree::parser::parse_requirement;
    ///
    /// let (requirement, _) = Requirement::from_declared(parse_requirement("b>=2.0.0").unwrap());
    /// let edge = DependencyEdge {
    ///     dependent: Arc::new(Package::new("a", "3.4.0")),
    ///     requirement: Arc::new(requirement),
    ///     dependency: None,
    /// };
    /// assert_eq!(edge.required_label(), "b [required: >=2.0.0, installed: ?]");
    /// assert_eq!(edge.requires_label(), "a==3.4.0 [requires: b>=2.0.0]");
    /// ```
    pub fn required_label(&self) -> String {
        format!(
            "{} [required: {}, installed: {}]",
            self.target_name(),
            self.requirement.version_spec().as_deref().unwrap_or("Any"),
            self.installed_version().unwrap_or("?")
        )
    }

    /// Describes the edge from the dependency's side (reversed view).
    pub fn requires_label(&self) -> String {
        format!(
            "{}=={} [requires: {}]",
            self.dependent.name, self.dependent.version, self.requirement
        )
    }

    /// True when the target is missing.
    pub fn is_missing(&self) -> bool {
        self.dependency.is_none()
    }

    /// True when the target is installed and satisfies the constraint.
    pub fn is_satisfied(&self) -> bool {
        self.installed_version()
            .is_some_and(|version| self.requirement.is_satisfied_by(version))
    }
}

/// Non-fatal findings recorded while building a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The same package key appeared more than once in the fact table.
    DuplicatePackage {
        key: String,
        kept_version: String,
        ignored_version: String,
    },
    /// More than one installed instance could satisfy a requirement.
    AmbiguousResolution {
        dependent: String,
        target: String,
        chosen_version: String,
        candidates: Vec<String>,
    },
    /// A requirement could not be parsed and was degraded or skipped.
    MalformedRequirement {
        dependent: String,
        requirement: String,
        reason: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicatePackage {
                key,
                kept_version,
                ignored_version,
            } => write!(
                f,
                "duplicate package '{}': using {}, ignoring {}",
                key, kept_version, ignored_version
            ),
            Self::AmbiguousResolution {
                dependent,
                target,
                chosen_version,
                candidates,
            } => write!(
                f,
                "{} requires '{}' which is installed as {}; resolved to {}",
                dependent,
                target,
                candidates.join(", "),
                chosen_version
            ),
            Self::MalformedRequirement {
                dependent,
                requirement,
                reason,
            } => write!(
                f,
                "{} declares malformed requirement '{}': {}",
                dependent, requirement, reason
            ),
        }
    }
}
