//! Version conflict and unsatisfied requirement detection.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::graph::{DependencyEdge, DependencyGraph, Package};

/// One package placing a constraint on a conflicted target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirer {
    /// Normalized key of the dependent
    pub key: String,
    /// Display name of the dependent
    pub name: String,
    /// Canonical constraint text
    pub version_spec: String,
    /// Whether the installed target satisfies this constraint
    pub satisfied: bool,
}

/// A package whose dependents disagree about acceptable versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// Normalized key of the target
    pub key: String,
    /// Display name of the target
    pub name: String,
    /// Installed version of the target
    pub installed_version: String,
    /// Every constrained requirer, sorted by key
    pub requirers: Vec<Requirer>,
}

impl Conflict {
    /// Human readable summary, e.g. `x==2.5 required as >=2.0 by a, <2.0 by b`.
    pub fn description(&self) -> String {
        let reqs: Vec<String> = self
            .requirers
            .iter()
            .map(|r| format!("{} by {}", r.version_spec, r.name))
            .collect();
        format!(
            "{}=={} required as {}",
            self.name,
            self.installed_version,
            reqs.join(", ")
        )
    }
}

/// Finds installed packages with incompatible version constraints.
///
/// A conflict needs at least two distinct dependents that constrain the
/// target, at least one of which rejects the installed version.
/// Unconstrained requirements and missing targets never contribute.
///
/// # Example
///
/// ```rust
/// use pkgdeptree::analysis::find_conflicts;
/// use pkgdeptree::graph::DependencyGraph;
/// use pkgdeptree::parser::PackageFact;
///
/// let graph = DependencyGraph::from_facts(&[
///     PackageFact::new("a", "1.0").requires("x", Some(">=2.0")),
///     PackageFact::new("b", "1.0").requires("x", Some("<2.0")),
///     PackageFact::new("x", "2.5"),
/// ]);
///
/// let conflicts = find_conflicts(&graph);
/// assert_eq!(conflicts.len(), 1);
/// assert_eq!(conflicts[0].key, "x");
/// ```
pub fn find_conflicts(graph: &DependencyGraph) -> Vec<Conflict> {
    let mut by_target: BTreeMap<&str, Vec<&DependencyEdge>> = BTreeMap::new();
    for (_, _, edge) in graph.edges() {
        if edge.is_missing() || edge.requirement.specifier.is_empty() {
            continue;
        }
        by_target.entry(edge.requirement.key.as_str()).or_default().push(edge);
    }

    by_target
        .into_values()
        .filter_map(|mut edges| {
            edges.sort_by(|a, b| a.dependent.key.cmp(&b.dependent.key));
            edges.dedup_by(|a, b| a.dependent.key == b.dependent.key);
            if edges.len() < 2 || edges.iter().all(|edge| edge.is_satisfied()) {
                return None;
            }
            let target = edges.first()?.dependency.as_deref()?;
            Some(Conflict {
                key: target.key.clone(),
                name: target.name.clone(),
                installed_version: target.version.clone(),
                requirers: edges
                    .iter()
                    .map(|edge| Requirer {
                        key: edge.dependent.key.clone(),
                        name: edge.dependent.name.clone(),
                        version_spec: edge.requirement.specifier.to_string(),
                        satisfied: edge.is_satisfied(),
                    })
                    .collect(),
            })
        })
        .collect()
}

/// A package with requirements the environment does not meet.
#[derive(Debug, Clone)]
pub struct Unsatisfied {
    /// The package declaring the requirements
    pub dependent: Arc<Package>,
    /// Offending requirements, sorted by target key
    pub requirements: Vec<DependencyEdge>,
}

/// Finds requirements whose target is missing or installed at a version
/// outside the declared constraint.
///
/// Sorted by dependent key, then requirement key.
pub fn find_unsatisfied(graph: &DependencyGraph) -> Vec<Unsatisfied> {
    let mut by_dependent: BTreeMap<&str, Vec<&DependencyEdge>> = BTreeMap::new();
    for (_, _, edge) in graph.edges() {
        if !edge.is_satisfied() {
            by_dependent.entry(edge.dependent.key.as_str()).or_default().push(edge);
        }
    }

    by_dependent
        .into_values()
        .filter_map(|mut edges| {
            edges.sort_by(|a, b| a.requirement.key.cmp(&b.requirement.key));
            let dependent = Arc::clone(&edges.first()?.dependent);
            Some(Unsatisfied {
                dependent,
                requirements: edges.into_iter().cloned().collect(),
            })
        })
        .collect()
}
