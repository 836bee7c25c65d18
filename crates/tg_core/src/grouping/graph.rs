//! Mutual-connection graph over roster indices.
//!
//! Nodes are indices into the roster slice; edges are stored as index-based
//! adjacency lists so the size-cap truncation in component extraction is an
//! explicit, testable step.

use std::collections::VecDeque;

use fxhash::FxHashSet;

#[derive(Debug, Clone)]
pub struct MutualGraph {
    adjacency: Vec<Vec<usize>>,
}

/// One connected component found by the capped traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Members kept under the cap, in visit order.
    pub members: Vec<usize>,
    /// Reachable nodes excluded once the cap was hit.
    pub overflow: Vec<usize>,
}

impl MutualGraph {
    pub fn new(node_count: usize) -> Self {
        Self { adjacency: vec![Vec::new(); node_count] }
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Insert an undirected edge; self-loops and duplicates are ignored.
    pub fn add_edge(&mut self, a: usize, b: usize) {
        if a == b || self.adjacency[a].contains(&b) {
            return;
        }
        self.adjacency[a].push(b);
        self.adjacency[b].push(a);
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.adjacency[a].contains(&b)
    }

    pub fn neighbors(&self, node: usize) -> &[usize] {
        &self.adjacency[node]
    }

    /// Connected components via breadth-first traversal, capping accumulated
    /// component size at `cap`.
    ///
    /// Overflow nodes are *not* marked as grouped: they may seed their own
    /// component later if still mutually connected to other ungrouped nodes.
    /// Components of size 1 are not reported.
    pub fn capped_components(&self, cap: usize) -> Vec<Component> {
        let mut grouped = vec![false; self.node_count()];
        let mut components = Vec::new();

        for start in 0..self.node_count() {
            if grouped[start] || self.adjacency[start].is_empty() {
                continue;
            }

            let mut members = vec![start];
            let mut overflow = Vec::new();
            let mut seen: FxHashSet<usize> = FxHashSet::default();
            seen.insert(start);
            let mut queue = VecDeque::from([start]);

            while let Some(node) = queue.pop_front() {
                for &next in self.neighbors(node) {
                    if grouped[next] || !seen.insert(next) {
                        continue;
                    }
                    if members.len() < cap {
                        members.push(next);
                        queue.push_back(next);
                    } else {
                        overflow.push(next);
                    }
                }
            }

            if members.len() > 1 {
                for &member in &members {
                    grouped[member] = true;
                }
                components.push(Component { members, overflow });
            }
        }

        components
    }
}
