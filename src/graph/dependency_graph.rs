//! Dependency graph implementation using petgraph.
//!
//! Builds a directed graph from the package fact table, with one node per
//! installed package (plus placeholders for required but absent ones) and
//! one edge per declared requirement.

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use super::package::{normalize_name, DependencyEdge, Diagnostic, Package, PackageNode, Requirement};
use crate::parser::PackageFact;

/// How a requirement is resolved when a package key is installed twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Use the first instance whose version satisfies the constraint,
    /// falling back to the first seen.
    #[default]
    PreferSatisfying,
    /// Always use the first instance seen in the fact table.
    FirstSeen,
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PreferSatisfying => write!(f, "prefer-satisfying"),
            Self::FirstSeen => write!(f, "first-seen"),
        }
    }
}

/// A directed graph of installed packages and their requirements.
///
/// In the forward view edges point from the dependent package to its
/// dependency. [`reverse`](Self::reverse) flips them so each package
/// points at the packages that require it.
///
/// # Example
///
/// ```rust
/// use pkgdeptree::graph::DependencyGraph;
/// use pkgdeptree::parser::PackageFact;
///
/// let graph = DependencyGraph::from_facts(&[
///     PackageFact::new("my-app", "1.0.0").requires("requests", Some(">=2.0")),
///     PackageFact::new("requests", "2.31.0").requires("urllib3", None),
///     PackageFact::new("urllib3", "2.0.7"),
/// ]);
///
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.edge_count(), 2);
/// assert_eq!(graph.root_keys(), vec!["my-app"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// The underlying directed graph
    graph: DiGraph<PackageNode, DependencyEdge>,
    /// Maps normalized keys to their node indices for O(1) lookup
    node_indices: HashMap<String, NodeIndex>,
    /// Every installed instance per key, in fact table order
    instances: HashMap<String, Vec<Arc<Package>>>,
    /// Findings recorded while building
    diagnostics: Vec<Diagnostic>,
    /// Whether edges point from dependency to dependent
    reversed: bool,
    /// Roots fixed by an include filter
    pinned_roots: Option<Vec<NodeIndex>>,
}

impl DependencyGraph {
    /// Creates a new empty dependency graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from a fact table with the default duplicate policy.
    pub fn from_facts(facts: &[PackageFact]) -> Self {
        Self::build(facts, DuplicatePolicy::default())
    }

    /// Builds the graph from a fact table.
    ///
    /// Construction never fails. Malformed requirements and duplicate
    /// installs are recorded as [`Diagnostic`]s; requirements on packages
    /// that are not installed point at a [`PackageNode::Missing`] node.
    ///
    /// # Arguments
    ///
    /// * `facts` - Installed packages in fact table order
    /// * `policy` - How to resolve requirements on duplicated keys
    pub fn build(facts: &[PackageFact], policy: DuplicatePolicy) -> Self {
        let mut graph = Self {
            graph: DiGraph::with_capacity(facts.len(), facts.len() * 2),
            node_indices: HashMap::with_capacity(facts.len()),
            ..Self::default()
        };

        let mut kept: Vec<(&PackageFact, Arc<Package>)> = Vec::with_capacity(facts.len());
        for fact in facts {
            let package = Arc::new(Package::from_fact(fact));
            let entry = graph.instances.entry(package.key.clone()).or_default();
            if let Some(first) = entry.first() {
                warn!(key = %package.key, "duplicate package in fact table");
                graph.diagnostics.push(Diagnostic::DuplicatePackage {
                    key: package.key.clone(),
                    kept_version: first.version.clone(),
                    ignored_version: package.version.clone(),
                });
                entry.push(package);
                continue;
            }
            entry.push(Arc::clone(&package));
            let idx = graph.graph.add_node(PackageNode::Installed(Arc::clone(&package)));
            graph.node_indices.insert(package.key.clone(), idx);
            kept.push((fact, package));
        }

        for (fact, dependent) in kept {
            graph.add_requirements(fact, &dependent, policy);
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            diagnostics = graph.diagnostics.len(),
            "built dependency graph"
        );
        graph
    }

    fn add_requirements(&mut self, fact: &PackageFact, dependent: &Arc<Package>, policy: DuplicatePolicy) {
        let Some(&from) = self.node_indices.get(&dependent.key) else {
            return;
        };
        let mut seen = HashSet::new();

        for declared in &fact.requirements {
            let declared = match declared.declared() {
                Ok(declared) => declared,
                Err(e) => {
                    self.diagnostics.push(Diagnostic::MalformedRequirement {
                        dependent: dependent.name.clone(),
                        requirement: declared.to_string(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            if declared.is_extra_only() {
                debug!(dependent = %dependent.key, requirement = %declared.name, "skipping extra-only requirement");
                continue;
            }

            let raw = declared.constraint.clone().unwrap_or_default();
            let (requirement, error) = Requirement::from_declared(declared);
            if !seen.insert(requirement.key.clone()) {
                continue;
            }
            if let Some(e) = error {
                warn!(dependent = %dependent.key, requirement = %requirement.name, "malformed constraint treated as any");
                self.diagnostics.push(Diagnostic::MalformedRequirement {
                    dependent: dependent.name.clone(),
                    requirement: format!("{}{}", requirement.name, raw),
                    reason: e.to_string(),
                });
            }

            let dependency = self.resolve(dependent, &requirement, policy);
            let to = self.target_node(&requirement);
            self.graph.add_edge(
                from,
                to,
                DependencyEdge {
                    dependent: Arc::clone(dependent),
                    requirement: Arc::new(requirement),
                    dependency,
                },
            );
        }
    }

    /// Picks the installed instance a requirement refers to.
    fn resolve(
        &mut self,
        dependent: &Package,
        requirement: &Requirement,
        policy: DuplicatePolicy,
    ) -> Option<Arc<Package>> {
        let candidates = self.instances.get(&requirement.key)?;
        let first = candidates.first()?;
        if candidates.len() == 1 || policy == DuplicatePolicy::FirstSeen {
            return Some(Arc::clone(first));
        }

        let chosen = if requirement.specifier.is_empty() {
            first
        } else {
            candidates
                .iter()
                .find(|pkg| requirement.is_satisfied_by(&pkg.version))
                .unwrap_or(first)
        };
        let chosen = Arc::clone(chosen);
        let versions = candidates.iter().map(|pkg| pkg.version.clone()).collect();
        self.diagnostics.push(Diagnostic::AmbiguousResolution {
            dependent: dependent.name.clone(),
            target: requirement.name.clone(),
            chosen_version: chosen.version.clone(),
            candidates: versions,
        });
        Some(chosen)
    }

    fn target_node(&mut self, requirement: &Requirement) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(&requirement.key) {
            return idx;
        }
        let idx = self.graph.add_node(PackageNode::Missing {
            key: requirement.key.clone(),
            name: requirement.name.clone(),
        });
        self.node_indices.insert(requirement.key.clone(), idx);
        idx
    }

    /// Returns the number of nodes, placeholders included.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Checks whether a package name (in any spelling) is in the graph.
    pub fn contains(&self, name: &str) -> bool {
        self.node_indices.contains_key(&normalize_name(name))
    }

    /// Looks up a node index by package name.
    pub fn index_of(&self, name: &str) -> Option<NodeIndex> {
        self.node_indices.get(&normalize_name(name)).copied()
    }

    /// Gets a node by package name.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pkgdeptree::graph::DependencyGraph;
    /// use pkgdeptree::parser::PackageFact;
    ///
    /// let graph = DependencyGraph::from_facts(&[PackageFact::new("Flask", "3.0.0")]);
    /// let node = graph.get_node("flask").unwrap();
    /// assert_eq!(node.name(), "Flask");
    /// assert_eq!(node.version(), Some("3.0.0"));
    /// ```
    pub fn get_node(&self, name: &str) -> Option<&PackageNode> {
        self.index_of(name).map(|idx| &self.graph[idx])
    }

    /// Gets the node weight at an index.
    pub fn node(&self, idx: NodeIndex) -> &PackageNode {
        &self.graph[idx]
    }

    /// Gets the edge weight at an index.
    pub fn edge(&self, idx: EdgeIndex) -> &DependencyEdge {
        &self.graph[idx]
    }

    /// All node indices sorted by key.
    pub fn nodes_sorted(&self) -> Vec<NodeIndex> {
        let mut nodes: Vec<NodeIndex> = self.graph.node_indices().collect();
        nodes.sort_by(|a, b| self.graph[*a].key().cmp(self.graph[*b].key()));
        nodes
    }

    /// Outgoing edges of a node as `(child, edge)` pairs sorted by child key.
    ///
    /// In the forward view children are dependencies; in the reversed view
    /// they are dependents.
    pub fn children(&self, idx: NodeIndex) -> Vec<(NodeIndex, &DependencyEdge)> {
        let mut children: Vec<(NodeIndex, &DependencyEdge)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|edge| (edge.target(), edge.weight()))
            .collect();
        children.sort_by(|a, b| self.graph[a.0].key().cmp(self.graph[b.0].key()));
        children
    }

    /// Number of outgoing edges of a node.
    pub fn out_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Outgoing).count()
    }

    /// Iterates over every edge as `(source, target, weight)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, &DependencyEdge)> {
        self.graph
            .edge_references()
            .map(|edge| (edge.source(), edge.target(), edge.weight()))
    }

    /// Gets the requirements a package declares, sorted by target key.
    ///
    /// Always follows the forward direction regardless of reversal.
    pub fn dependencies(&self, name: &str) -> Vec<&DependencyEdge> {
        let direction = if self.reversed {
            Direction::Incoming
        } else {
            Direction::Outgoing
        };
        self.edges_of(name, direction, |edge| &edge.requirement.key)
    }

    /// Gets the requirements other packages declare on a package, sorted
    /// by dependent key.
    pub fn dependents(&self, name: &str) -> Vec<&DependencyEdge> {
        let direction = if self.reversed {
            Direction::Outgoing
        } else {
            Direction::Incoming
        };
        self.edges_of(name, direction, |edge| &edge.dependent.key)
    }

    fn edges_of(
        &self,
        name: &str,
        direction: Direction,
        sort_key: impl Fn(&DependencyEdge) -> &String,
    ) -> Vec<&DependencyEdge> {
        let Some(idx) = self.index_of(name) else {
            return Vec::new();
        };
        let mut edges: Vec<&DependencyEdge> = self
            .graph
            .edges_directed(idx, direction)
            .map(|edge| edge.weight())
            .collect();
        edges.sort_by(|a, b| sort_key(a).cmp(sort_key(b)));
        edges
    }

    /// Nodes shown at the top level of a tree, sorted by key.
    ///
    /// After an include filter these are exactly the matched packages.
    /// Otherwise they are the members of every strongly connected component
    /// with no incoming edge from outside itself: plain roots in a DAG, and
    /// every member of a cycle nothing else depends on. Placeholders only
    /// qualify when they have outgoing edges (reversed view).
    pub fn roots(&self) -> Vec<NodeIndex> {
        if let Some(pinned) = &self.pinned_roots {
            let mut roots = pinned.clone();
            roots.sort_by(|a, b| self.graph[*a].key().cmp(self.graph[*b].key()));
            return roots;
        }

        let components = tarjan_scc(&self.graph);
        let mut component_of = vec![0usize; self.graph.node_count()];
        for (i, component) in components.iter().enumerate() {
            for idx in component {
                component_of[idx.index()] = i;
            }
        }
        let mut entered = vec![false; components.len()];
        for edge in self.graph.edge_references() {
            let (source, target) = (component_of[edge.source().index()], component_of[edge.target().index()]);
            if source != target {
                entered[target] = true;
            }
        }

        let mut roots: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|idx| !entered[component_of[idx.index()]])
            .filter(|idx| self.is_visible(*idx))
            .collect();
        roots.sort_by(|a, b| self.graph[*a].key().cmp(self.graph[*b].key()));
        roots
    }

    /// Keys of [`roots`](Self::roots).
    pub fn root_keys(&self) -> Vec<&str> {
        self.roots().into_iter().map(|idx| self.graph[idx].key()).collect()
    }

    /// Whether a node is listed on its own in flat outputs.
    ///
    /// Installed packages always are; placeholders only when they have
    /// children.
    pub fn is_visible(&self, idx: NodeIndex) -> bool {
        !self.graph[idx].is_missing() || self.out_degree(idx) > 0
    }

    /// Returns a graph with every edge flipped.
    ///
    /// Node and edge weights are shared with `self`; applying it twice
    /// gives back the original structure.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pkgdeptree::graph::DependencyGraph;
    /// use pkgdeptree::parser::PackageFact;
    ///
    /// let graph = DependencyGraph::from_facts(&[
    ///     PackageFact::new("a", "1.0").requires("b", None),
    ///     PackageFact::new("b", "1.0"),
    /// ]);
    /// let reversed = graph.reverse();
    /// assert!(reversed.is_reversed());
    /// assert_eq!(reversed.root_keys(), vec!["b"]);
    /// ```
    pub fn reverse(&self) -> Self {
        let mut graph = DiGraph::with_capacity(self.graph.node_count(), self.graph.edge_count());
        for node in self.graph.node_weights() {
            graph.add_node(node.clone());
        }
        for edge in self.graph.edge_references() {
            graph.add_edge(edge.target(), edge.source(), edge.weight().clone());
        }
        debug!(reversed = !self.reversed, "reversed dependency graph");
        Self {
            graph,
            node_indices: self.node_indices.clone(),
            instances: self.instances.clone(),
            diagnostics: self.diagnostics.clone(),
            reversed: !self.reversed,
            pinned_roots: self.pinned_roots.clone(),
        }
    }

    /// True when edges point from dependency to dependent.
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Checks if the graph contains cycles.
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Strongly connected components that contain a cycle: every component
    /// with more than one member, plus single packages requiring themselves.
    pub fn cyclic_components(&self) -> Vec<Vec<NodeIndex>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| match component.as_slice() {
                [single] => self.graph.contains_edge(*single, *single),
                members => members.len() > 1,
            })
            .collect()
    }

    /// Findings recorded while building.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Every installed instance of a package, in fact table order.
    pub fn instances(&self, name: &str) -> &[Arc<Package>] {
        self.instances
            .get(&normalize_name(name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Builds the subgraph induced by `keep`, preserving index order.
    ///
    /// `pinned` fixes the roots of the result; indices refer to `self`.
    pub(crate) fn retain(&self, keep: &HashSet<NodeIndex>, pinned: Option<&[NodeIndex]>) -> Self {
        let mut graph = DiGraph::with_capacity(keep.len(), self.graph.edge_count());
        let mut node_indices = HashMap::with_capacity(keep.len());
        let mut remap = HashMap::with_capacity(keep.len());

        for idx in self.graph.node_indices().filter(|idx| keep.contains(idx)) {
            let node = self.graph[idx].clone();
            let new_idx = graph.add_node(node);
            node_indices.insert(self.graph[idx].key().to_string(), new_idx);
            remap.insert(idx, new_idx);
        }
        for edge in self.graph.edge_references() {
            if let (Some(&from), Some(&to)) = (remap.get(&edge.source()), remap.get(&edge.target())) {
                graph.add_edge(from, to, edge.weight().clone());
            }
        }

        let pinned_roots = pinned
            .map(|roots| roots.iter().filter_map(|idx| remap.get(idx).copied()).collect())
            .or_else(|| {
                self.pinned_roots
                    .as_ref()
                    .map(|roots| roots.iter().filter_map(|idx| remap.get(idx).copied()).collect())
            });

        Self {
            graph,
            node_indices,
            instances: self.instances.clone(),
            diagnostics: self.diagnostics.clone(),
            reversed: self.reversed,
            pinned_roots,
        }
    }

    /// Nodes reachable from `starts` by following outgoing edges,
    /// the starts included.
    pub(crate) fn reachable_from(&self, starts: &[NodeIndex]) -> HashSet<NodeIndex> {
        let mut seen: HashSet<NodeIndex> = HashSet::new();
        let mut stack: Vec<NodeIndex> = starts.to_vec();
        while let Some(idx) = stack.pop() {
            if !seen.insert(idx) {
                continue;
            }
            stack.extend(
                self.graph
                    .neighbors_directed(idx, Direction::Outgoing)
                    .filter(|next| !seen.contains(next)),
            );
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::RequirementFact;
    use proptest::prelude::*;

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

    #[test]
    fn test_create_empty_graph() {
        let graph = DependencyGraph::new();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.is_empty());
        assert!(graph.roots().is_empty());
    }

    #[test]
    fn test_build_from_facts() {
        let graph = DependencyGraph::from_facts(&facts());
        assert_eq!(graph.node_count(), 7);
        assert_eq!(graph.edge_count(), 8);
        assert!(graph.diagnostics().is_empty());
        assert!(!graph.has_cycles());
        assert_eq!(graph.root_keys(), vec!["a", "g"]);
    }

    #[test]
    fn test_children_sorted_by_key() {
        let graph = DependencyGraph::from_facts(&facts());
        let g = graph.index_of("g").unwrap();
        let keys: Vec<&str> = graph
            .children(g)
            .into_iter()
            .map(|(idx, _)| graph.node(idx).key())
            .collect();
        assert_eq!(keys, vec!["e", "f"]);
    }

    #[test]
    fn test_missing_target_becomes_placeholder() {
        let graph = DependencyGraph::from_facts(&[PackageFact::new("a", "1.0").requires("Not_There", Some(">=1"))]);
        let node = graph.get_node("not-there").unwrap();
        assert!(node.is_missing());
        assert_eq!(node.name(), "Not_There");

        let deps = graph.dependencies("a");
        assert_eq!(deps.len(), 1);
        assert!(deps[0].is_missing());
        assert_eq!(graph.root_keys(), vec!["a"]);
    }

    #[test]
    fn test_names_are_normalized() {
        let graph = DependencyGraph::from_facts(&[
            PackageFact::new("Foo.Bar", "1.0").requires("typing_extensions", None),
            PackageFact::new("typing-extensions", "4.9.0"),
        ]);
        assert!(graph.contains("foo_bar"));
        assert!(!graph.get_node("TYPING.EXTENSIONS").unwrap().is_missing());
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_malformed_constraint_degrades_to_any() {
        let graph = DependencyGraph::from_facts(&[
            PackageFact::new("a", "1.0").requires("b", Some("~~1")),
            PackageFact::new("b", "1.0"),
        ]);
        let deps = graph.dependencies("a");
        assert_eq!(deps[0].requirement.version_spec(), None);
        assert!(matches!(
            graph.diagnostics(),
            [Diagnostic::MalformedRequirement { .. }]
        ));
    }

    #[test]
    fn test_nameless_requirement_is_skipped() {
        let mut fact = PackageFact::new("a", "1.0");
        fact.requirements.push(RequirementFact::Line(">=1.0".into()));
        let graph = DependencyGraph::from_facts(&[fact]);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.diagnostics().len(), 1);
    }

    #[test]
    fn test_extra_requirements_skipped_and_duplicates_collapsed() {
        let mut fact = PackageFact::new("a", "1.0");
        fact.requirements.push(RequirementFact::Line("b>=1".into()));
        fact.requirements.push(RequirementFact::Line("B<5".into()));
        fact.requirements.push(RequirementFact::Line("pytest; extra == 'test'".into()));
        let graph = DependencyGraph::from_facts(&[fact, PackageFact::new("b", "2.0")]);

        let deps = graph.dependencies("a");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].requirement.version_spec().as_deref(), Some(">=1"));
        assert!(!graph.contains("pytest"));
    }

    #[test]
    fn test_duplicate_prefer_satisfying() {
        let graph = DependencyGraph::from_facts(&[
            PackageFact::new("a", "1.0").requires("b", Some(">=2")),
            PackageFact::new("b", "1.0"),
            PackageFact::new("b", "2.5"),
        ]);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.get_node("b").unwrap().version(), Some("1.0"));
        assert_eq!(graph.instances("b").len(), 2);
        assert_eq!(graph.dependencies("a")[0].installed_version(), Some("2.5"));
        assert!(graph
            .diagnostics()
            .iter()
            .any(|d| matches!(d, Diagnostic::DuplicatePackage { key, .. } if key == "b")));
        assert!(graph
            .diagnostics()
            .iter()
            .any(|d| matches!(d, Diagnostic::AmbiguousResolution { chosen_version, .. } if chosen_version == "2.5")));
    }

    #[test]
    fn test_duplicate_first_seen() {
        let graph = DependencyGraph::build(
            &[
                PackageFact::new("a", "1.0").requires("b", Some(">=2")),
                PackageFact::new("b", "1.0"),
                PackageFact::new("b", "2.5"),
            ],
            DuplicatePolicy::FirstSeen,
        );
        assert_eq!(graph.dependencies("a")[0].installed_version(), Some("1.0"));
        assert_eq!(graph.diagnostics().len(), 1);
    }

    #[test]
    fn test_cycle_members_are_roots() {
        let graph = DependencyGraph::from_facts(&[
            PackageFact::new("a", "1.0").requires("b", Some(">=1.0")),
            PackageFact::new("b", "1.0").requires("a", Some(">=1.0")),
        ]);
        assert!(graph.has_cycles());
        assert_eq!(graph.root_keys(), vec!["a", "b"]);
        assert_eq!(graph.reverse().root_keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_self_loop_is_root() {
        let graph = DependencyGraph::from_facts(&[PackageFact::new("p", "1.0").requires("p", None)]);
        assert_eq!(graph.root_keys(), vec!["p"]);
    }

    #[test]
    fn test_cycle_below_root_is_not_root() {
        let graph = DependencyGraph::from_facts(&[
            PackageFact::new("r", "1.0").requires("a", None),
            PackageFact::new("a", "1.0").requires("b", None),
            PackageFact::new("b", "1.0").requires("a", None),
        ]);
        assert_eq!(graph.root_keys(), vec!["r"]);
    }

    #[test]
    fn test_reverse_direction() {
        let graph = DependencyGraph::from_facts(&facts());
        let reversed = graph.reverse();
        assert!(reversed.is_reversed());
        assert_eq!(reversed.root_keys(), vec!["d", "e"]);

        // Forward accessors still follow declarations.
        let deps: Vec<&str> = reversed
            .dependencies("a")
            .iter()
            .map(|e| e.requirement.key.as_str())
            .collect();
        assert_eq!(deps, vec!["b", "c"]);
        let dependents: Vec<&str> = reversed
            .dependents("d")
            .iter()
            .map(|e| e.dependent.key.as_str())
            .collect();
        assert_eq!(dependents, vec!["b", "c"]);
    }

    #[test]
    fn test_reversed_missing_placeholder_is_root() {
        let graph = DependencyGraph::from_facts(&[PackageFact::new("a", "1.0").requires("x", None)]);
        let reversed = graph.reverse();
        assert_eq!(reversed.root_keys(), vec!["x"]);
    }

    #[test]
    fn test_every_node_reachable_from_roots() {
        let graph = DependencyGraph::from_facts(&facts());
        let reached = graph.reachable_from(&graph.roots());
        assert_eq!(reached.len(), graph.node_count());
    }

    /// Node keys and `(from, to, requirement)` triples, for structural comparison.
    fn shape(graph: &DependencyGraph) -> (Vec<String>, Vec<(String, String, String)>) {
        let nodes = graph
            .nodes_sorted()
            .into_iter()
            .map(|idx| graph.node(idx).key().to_string())
            .collect();
        let mut edges: Vec<(String, String, String)> = graph
            .edges()
            .map(|(from, to, edge)| {
                (
                    graph.node(from).key().to_string(),
                    graph.node(to).key().to_string(),
                    edge.requirement.to_string(),
                )
            })
            .collect();
        edges.sort();
        (nodes, edges)
    }

    fn arb_facts() -> impl Strategy<Value = Vec<PackageFact>> {
        let names = ["a", "b", "c", "d", "e", "f"];
        proptest::collection::vec(
            (0usize..6, proptest::collection::vec((0usize..8, any::<bool>()), 0..4)),
            0..8,
        )
        .prop_map(move |entries| {
            entries
                .into_iter()
                .map(|(name, reqs)| {
                    reqs.into_iter().fold(PackageFact::new(names[name], "1.0"), |fact, (target, pinned)| {
                        // Targets past the name table are never installed.
                        let target = names.get(target).copied().unwrap_or("missing");
                        fact.requires(target, pinned.then_some(">=1.0"))
                    })
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn test_double_reverse_is_identity(facts in arb_facts()) {
            let graph = DependencyGraph::from_facts(&facts);
            let twice = graph.reverse().reverse();
            prop_assert!(!twice.is_reversed());
            prop_assert_eq!(shape(&twice), shape(&graph));
            prop_assert_eq!(twice.root_keys(), graph.root_keys());
        }

        #[test]
        fn test_every_node_reachable_from_some_root(facts in arb_facts()) {
            let graph = DependencyGraph::from_facts(&facts);
            let reached = graph.reachable_from(&graph.roots());
            let visible = graph.nodes_sorted().into_iter().filter(|idx| graph.is_visible(*idx));
            for idx in visible {
                prop_assert!(reached.contains(&idx));
            }
        }
    }
}
