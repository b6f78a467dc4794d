//! Cycle detection over the dependency graph.

use petgraph::graph::NodeIndex;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::graph::DependencyGraph;

/// A dependency cycle, rotated to start at its smallest key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Normalized keys along the cycle
    pub keys: Vec<String>,
    /// Display names along the cycle, parallel to `keys`
    pub names: Vec<String>,
}

impl Cycle {
    /// Returns the cycle as a closed path, e.g. `a => b => a`.
    pub fn cycle_path(&self) -> String {
        match self.names.first() {
            Some(first) => format!("{} => {}", self.names.join(" => "), first),
            None => String::new(),
        }
    }

    /// Number of packages in the cycle.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the cycle is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Finds every distinct simple dependency cycle.
///
/// The graph is split into strongly connected components; cycles never
/// leave a component, so each one is searched on its own. Inside a
/// component the members are ranked by key and, for each anchor in turn,
/// a depth-first walk over members ranked after it collects the circuits
/// that return to the anchor. Blocked nodes are released only when a
/// circuit through them is found, which keeps the walk proportional to
/// the number of cycles reported. Self-loops are one-package cycles.
///
/// Every cycle starts at its smallest key, so the result is sorted and
/// does not depend on fact table order.
///
/// # Example
///
/// ```rust
/// use pkgdeptree::analysis::find_cycles;
/// use pkgdeptree::graph::DependencyGraph;
/// use pkgdeptree::parser::PackageFact;
///
/// let graph = DependencyGraph::from_facts(&[
///     PackageFact::new("b", "1.0").requires("a", None),
///     PackageFact::new("a", "1.0").requires("b", None),
/// ]);
///
/// let cycles = find_cycles(&graph);
/// assert_eq!(cycles.len(), 1);
/// assert_eq!(cycles[0].cycle_path(), "a => b => a");
/// ```
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    if !graph.has_cycles() {
        return Vec::new();
    }

    let mut found: BTreeMap<Vec<String>, Vec<String>> = BTreeMap::new();
    for component in graph.cyclic_components() {
        let mut members = component;
        members.sort_by(|a, b| graph.node(*a).key().cmp(graph.node(*b).key()));
        let rank: HashMap<NodeIndex, usize> = members.iter().enumerate().map(|(i, idx)| (*idx, i)).collect();
        let adjacency: Vec<Vec<usize>> = members
            .iter()
            .map(|idx| {
                graph
                    .children(*idx)
                    .into_iter()
                    .filter_map(|(child, _)| rank.get(&child).copied())
                    .collect()
            })
            .collect();

        for circuit in Circuits::new(&adjacency).collect_all() {
            let keys = circuit.iter().map(|i| graph.node(members[*i]).key().to_string()).collect();
            let names = circuit.iter().map(|i| graph.node(members[*i]).name().to_string()).collect();
            found.entry(keys).or_insert(names);
        }
    }

    found
        .into_iter()
        .map(|(keys, names)| Cycle { keys, names })
        .collect()
}

/// Circuit enumeration over one component, members addressed by rank.
struct Circuits<'a> {
    adjacency: &'a [Vec<usize>],
    blocked: Vec<bool>,
    blocked_by: Vec<HashSet<usize>>,
}

/// One level of the explicit walk stack.
struct Frame {
    node: usize,
    next: usize,
    closed: bool,
}

impl<'a> Circuits<'a> {
    fn new(adjacency: &'a [Vec<usize>]) -> Self {
        let n = adjacency.len();
        Self {
            adjacency,
            blocked: vec![false; n],
            blocked_by: vec![HashSet::new(); n],
        }
    }

    fn collect_all(mut self) -> Vec<Vec<usize>> {
        let mut circuits = Vec::new();
        for anchor in 0..self.adjacency.len() {
            self.blocked.iter_mut().for_each(|b| *b = false);
            self.blocked_by.iter_mut().for_each(HashSet::clear);
            self.from_anchor(anchor, &mut circuits);
        }
        circuits
    }

    fn from_anchor(&mut self, anchor: usize, circuits: &mut Vec<Vec<usize>>) {
        let adjacency = self.adjacency;
        let mut path = vec![anchor];
        self.blocked[anchor] = true;
        let mut frames = vec![Frame {
            node: anchor,
            next: 0,
            closed: false,
        }];

        while let Some(frame) = frames.last_mut() {
            let node = frame.node;
            if let Some(&child) = adjacency[node].get(frame.next) {
                frame.next += 1;
                if child == anchor {
                    circuits.push(path.clone());
                    frame.closed = true;
                } else if child > anchor && !self.blocked[child] {
                    path.push(child);
                    self.blocked[child] = true;
                    frames.push(Frame {
                        node: child,
                        next: 0,
                        closed: false,
                    });
                }
                continue;
            }

            let closed = frame.closed;
            frames.pop();
            path.pop();
            if closed {
                self.unblock(node);
            } else {
                for &child in &adjacency[node] {
                    if child > anchor {
                        self.blocked_by[child].insert(node);
                    }
                }
            }
            if let Some(parent) = frames.last_mut() {
                parent.closed |= closed;
            }
        }
    }

    fn unblock(&mut self, node: usize) {
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            if self.blocked[current] {
                self.blocked[current] = false;
                pending.extend(self.blocked_by[current].drain());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PackageFact;

    fn keys(cycles: &[Cycle]) -> Vec<Vec<&str>> {
        cycles
            .iter()
            .map(|c| c.keys.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn test_no_cycles_in_dag() {
        let graph = DependencyGraph::from_facts(&[
            PackageFact::new("a", "1.0").requires("b", None).requires("c", None),
            PackageFact::new("b", "1.0").requires("c", None),
            PackageFact::new("c", "1.0"),
        ]);
        assert!(find_cycles(&graph).is_empty());
    }

    #[test]
    fn test_two_cycles_through_shared_node() {
        let graph = DependencyGraph::from_facts(&[
            PackageFact::new("a", "1.0").requires("b", None),
            PackageFact::new("b", "1.0").requires("a", None).requires("c", None),
            PackageFact::new("c", "1.0").requires("b", None),
        ]);
        let cycles = find_cycles(&graph);
        assert_eq!(keys(&cycles), vec![vec!["a", "b"], vec!["b", "c"]]);
    }

    #[test]
    fn test_mutual_pair_inside_larger_cycle() {
        let graph = DependencyGraph::from_facts(&[
            PackageFact::new("a", "1.0").requires("b", None).requires("c", None),
            PackageFact::new("b", "1.0").requires("c", None),
            PackageFact::new("c", "1.0").requires("a", None),
        ]);
        let cycles = find_cycles(&graph);
        assert_eq!(keys(&cycles), vec![vec!["a", "b", "c"], vec!["a", "c"]]);
        assert_eq!(cycles[1].cycle_path(), "a => c => a");
    }

    #[test]
    fn test_every_simple_cycle_of_dense_component() {
        // Each pair requires the other, giving three pairs and two triangles.
        let graph = DependencyGraph::from_facts(&[
            PackageFact::new("x", "1.0").requires("y", None).requires("z", None),
            PackageFact::new("y", "1.0").requires("x", None).requires("z", None),
            PackageFact::new("z", "1.0").requires("x", None).requires("y", None),
        ]);
        assert_eq!(
            keys(&find_cycles(&graph)),
            vec![
                vec!["x", "y"],
                vec!["x", "y", "z"],
                vec!["x", "z"],
                vec!["x", "z", "y"],
                vec!["y", "z"],
            ]
        );
    }

    #[test]
    fn test_cycles_in_separate_components() {
        let graph = DependencyGraph::from_facts(&[
            PackageFact::new("app", "1.0").requires("m", None).requires("q", None),
            PackageFact::new("m", "1.0").requires("n", None),
            PackageFact::new("n", "1.0").requires("m", None),
            PackageFact::new("q", "1.0").requires("q", None),
        ]);
        assert_eq!(keys(&find_cycles(&graph)), vec![vec!["m", "n"], vec!["q"]]);
    }

    #[test]
    fn test_self_loop() {
        let graph = DependencyGraph::from_facts(&[PackageFact::new("P", "1.0").requires("p", None)]);
        let cycles = find_cycles(&graph);
        assert_eq!(keys(&cycles), vec![vec!["p"]]);
        assert_eq!(cycles[0].cycle_path(), "P => P");
    }

    #[test]
    fn test_rotation_and_order_independence() {
        let forward = [
            PackageFact::new("x", "1.0").requires("y", None),
            PackageFact::new("y", "1.0").requires("z", None),
            PackageFact::new("z", "1.0").requires("x", None),
        ];
        let mut shuffled = forward.to_vec();
        shuffled.reverse();

        let a = find_cycles(&DependencyGraph::from_facts(&forward));
        let b = find_cycles(&DependencyGraph::from_facts(&shuffled));
        assert_eq!(a, b);
        assert_eq!(keys(&a), vec![vec!["x", "y", "z"]]);
    }

    #[test]
    fn test_cycles_in_reversed_graph() {
        let graph = DependencyGraph::from_facts(&[
            PackageFact::new("a", "1.0").requires("b", None),
            PackageFact::new("b", "1.0").requires("c", None),
            PackageFact::new("c", "1.0").requires("a", None),
        ]);
        let cycles = find_cycles(&graph.reverse());
        assert_eq!(keys(&cycles), vec![vec!["a", "c", "b"]]);
    }
}
