//! Include and exclude filtering by package name pattern.

use glob::{MatchOptions, Pattern};
use petgraph::graph::NodeIndex;
use std::collections::HashSet;
use tracing::debug;

use super::dependency_graph::DependencyGraph;
use super::package::normalize_name;

/// Errors that reject a filter before any graph is derived.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// Include and exclude were both given.
    #[error("cannot use include and exclude patterns together")]
    MutuallyExclusive,

    /// No package matched any include pattern.
    #[error("No packages matched using the following patterns: {}", .patterns.join(", "))]
    NoMatch { patterns: Vec<String> },

    /// Exclude-dependencies was requested without exclude patterns.
    #[error("excluding dependencies requires at least one exclude pattern")]
    ExcludeDependenciesWithoutExclude,
}

/// A case-insensitive package name pattern.
///
/// `foo.*` (also `foo-*` and `foo_*`) matches `foo` itself and every key
/// starting with `foo-`. Other patterns containing `*`, `?` or `[` are
/// shell globs. Anything else must equal the normalized key.
///
/// # Example
///
/// ```rust
/// use pkgdeptree::graph::NamePattern;
///
/// let pattern = NamePattern::new("foo.*");
/// assert!(pattern.matches("foo"));
/// assert!(pattern.matches("Foo.BAZ"));
/// assert!(!pattern.matches("foobar"));
/// ```
#[derive(Debug, Clone)]
pub enum NamePattern {
    /// Matches a key exactly.
    Exact(String),
    /// Matches a key and its dotted or dashed children.
    Prefix(String),
    /// Shell glob over the key.
    Glob(Pattern),
}

impl NamePattern {
    /// Compiles a user supplied pattern.
    ///
    /// A glob that fails to compile falls back to exact matching.
    pub fn new(pattern: &str) -> Self {
        let trimmed = pattern.trim();
        for suffix in [".*", "-*", "_*"] {
            if let Some(stem) = trimmed.strip_suffix(suffix) {
                if !stem.is_empty() && !has_glob_chars(stem) {
                    return Self::Prefix(normalize_name(stem));
                }
            }
        }
        if has_glob_chars(trimmed) {
            let lowered = trimmed.to_lowercase();
            if let Ok(glob) = Pattern::new(&normalize_glob(&lowered)) {
                return Self::Glob(glob);
            }
        }
        Self::Exact(normalize_name(trimmed))
    }

    /// Checks a package name in any spelling against the pattern.
    pub fn matches(&self, name: &str) -> bool {
        let key = normalize_name(name);
        match self {
            Self::Exact(expected) => key == *expected,
            Self::Prefix(stem) => {
                key == *stem
                    || key
                        .strip_prefix(stem.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            Self::Glob(glob) => glob.matches_with(
                &key,
                MatchOptions {
                    case_sensitive: false,
                    ..MatchOptions::new()
                },
            ),
        }
    }
}

fn has_glob_chars(text: &str) -> bool {
    text.contains(['*', '?', '['])
}

/// Normalizes the literal parts of a glob the same way keys are normalized.
fn normalize_glob(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut literal = String::new();
    let mut in_class = false;
    for c in pattern.chars() {
        match c {
            '[' if !in_class => {
                out.push_str(&normalize_literal(&literal));
                literal.clear();
                in_class = true;
                out.push(c);
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            '*' | '?' if !in_class => {
                out.push_str(&normalize_literal(&literal));
                literal.clear();
                out.push(c);
            }
            _ if in_class => out.push(c),
            _ => literal.push(c),
        }
    }
    out.push_str(&normalize_literal(&literal));
    out
}

fn normalize_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_separator = false;
    for c in text.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.push(c);
            in_separator = false;
        }
    }
    out
}

/// Which packages to keep in a derived graph.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    /// Packages to show, together with everything they reach
    pub include: Vec<String>,
    /// Packages to hide
    pub exclude: Vec<String>,
    /// Also hide everything reachable from excluded packages
    pub exclude_dependencies: bool,
}

impl FilterSpec {
    /// Filter that keeps `patterns` and what they reach.
    pub fn include<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: patterns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Filter that drops `patterns`.
    pub fn exclude<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exclude: patterns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// True when the filter keeps everything.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty() && !self.exclude_dependencies
    }
}

/// Derives a filtered graph, leaving the source untouched.
///
/// With include patterns the result holds the matched packages and all
/// nodes reachable from them, and its roots are exactly the matched
/// packages. With exclude patterns the matched packages and the edges
/// into them are removed.
///
/// # Errors
///
/// Returns [`FilterError`] for conflicting options or when include
/// patterns match nothing.
///
/// # Example
///
/// ```rust
/// use pkgdeptree::graph::{filter, DependencyGraph, FilterSpec};
/// use pkgdeptree::parser::PackageFact;
///
/// let graph = DependencyGraph::from_facts(&[
///     PackageFact::new("a", "1.0").requires("b", None),
///     PackageFact::new("b", "1.0").requires("c", None),
///     PackageFact::new("c", "1.0"),
/// ]);
///
/// let only_b = filter(&graph, &FilterSpec::include(["b"])).unwrap();
/// assert_eq!(only_b.root_keys(), vec!["b"]);
/// assert_eq!(only_b.node_count(), 2);
/// ```
pub fn filter(graph: &DependencyGraph, spec: &FilterSpec) -> Result<DependencyGraph, FilterError> {
    if !spec.include.is_empty() && !spec.exclude.is_empty() {
        return Err(FilterError::MutuallyExclusive);
    }
    if spec.exclude_dependencies && spec.exclude.is_empty() {
        return Err(FilterError::ExcludeDependenciesWithoutExclude);
    }
    if spec.is_empty() {
        return Ok(graph.clone());
    }

    if !spec.include.is_empty() {
        let patterns: Vec<NamePattern> = spec.include.iter().map(|p| NamePattern::new(p)).collect();
        let matched = matching_nodes(graph, &patterns);
        if matched.is_empty() {
            return Err(FilterError::NoMatch {
                patterns: spec.include.clone(),
            });
        }
        let keep = graph.reachable_from(&matched);
        debug!(matched = matched.len(), kept = keep.len(), "applied include filter");
        return Ok(graph.retain(&keep, Some(&matched)));
    }

    let patterns: Vec<NamePattern> = spec.exclude.iter().map(|p| NamePattern::new(p)).collect();
    let excluded = matching_nodes(graph, &patterns);
    let removed: HashSet<NodeIndex> = if spec.exclude_dependencies {
        graph.reachable_from(&excluded)
    } else {
        excluded.into_iter().collect()
    };

    // Placeholders only exist because something required them.
    let remaining: HashSet<NodeIndex> = graph
        .nodes_sorted()
        .into_iter()
        .filter(|idx| !removed.contains(idx))
        .collect();
    let mut keep: HashSet<NodeIndex> = remaining
        .iter()
        .copied()
        .filter(|idx| !graph.node(*idx).is_missing())
        .collect();
    for (from, to, _) in graph.edges() {
        if remaining.contains(&from) && remaining.contains(&to) {
            keep.insert(from);
            keep.insert(to);
        }
    }
    debug!(removed = removed.len(), kept = keep.len(), "applied exclude filter");
    Ok(graph.retain(&keep, None))
}

fn matching_nodes(graph: &DependencyGraph, patterns: &[NamePattern]) -> Vec<NodeIndex> {
    graph
        .nodes_sorted()
        .into_iter()
        .filter(|idx| {
            let key = graph.node(*idx).key();
            patterns.iter().any(|pattern| pattern.matches(key))
        })
        .collect()
}
