//! # Graph Model
//!
//! In-memory directed graph over direct links, rebuilt for every
//! recomputation from the rows the caller supplies. Nothing here is
//! persisted and nothing outlives the call that built it.
//!
//! Only `level == 1` rows become edges. Rows with a higher level are a cache
//! of earlier results; they still register their endpoints as nodes.

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::model::{Link, SentenceId};

/// Outgoing edges of one node: `(target, weight)`.
pub type Adjacency = SmallVec<[(SentenceId, u32); 4]>;

/// Weighted directed graph keyed by sentence id.
#[derive(Debug, Clone, Default)]
pub struct Digraph {
    nodes: HashSet<SentenceId>,
    out: HashMap<SentenceId, Adjacency>,
    edge_count: usize,
}

impl Digraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from persisted rows.
    pub fn build<'a>(rows: impl IntoIterator<Item = &'a Link>) -> Self {
        let mut graph = Self::new();
        for row in rows {
            graph.add_node(row.source);
            graph.add_node(row.target);
            if row.is_direct() {
                graph.add_link(row.source, row.target);
            }
        }
        graph
    }

    pub fn add_node(&mut self, node: SentenceId) -> bool {
        self.nodes.insert(node)
    }

    /// Add a unit-weight edge.
    pub fn add_link(&mut self, source: SentenceId, target: SentenceId) {
        self.add_edge(source, target, 1);
    }

    /// Add (or re-weight) the edge `source -> target`. Missing endpoints are
    /// added as nodes.
    pub fn add_edge(&mut self, source: SentenceId, target: SentenceId, weight: u32) {
        self.add_node(source);
        self.add_node(target);
        let adj = self.out.entry(source).or_default();
        match adj.iter_mut().find(|(t, _)| *t == target) {
            Some(entry) => entry.1 = weight,
            None => {
                adj.push((target, weight));
                self.edge_count += 1;
            }
        }
    }

    /// Remove the edge `source -> target`. Returns false (and changes
    /// nothing) when the edge does not exist.
    pub fn remove_edge(&mut self, source: SentenceId, target: SentenceId) -> bool {
        let Some(adj) = self.out.get_mut(&source) else {
            return false;
        };
        let before = adj.len();
        adj.retain(|(t, _)| *t != target);
        let removed = adj.len() != before;
        if removed {
            self.edge_count -= 1;
        }
        removed
    }

    pub fn contains_node(&self, node: SentenceId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn contains_edge(&self, source: SentenceId, target: SentenceId) -> bool {
        self.neighbors(source).iter().any(|(t, _)| *t == target)
    }

    /// Outgoing `(target, weight)` pairs of a node; empty for unknown nodes.
    pub fn neighbors(&self, node: SentenceId) -> &[(SentenceId, u32)] {
        self.out.get(&node).map(|adj| adj.as_slice()).unwrap_or(&[])
    }

    /// All nodes in ascending id order.
    pub fn nodes(&self) -> Vec<SentenceId> {
        let mut nodes: Vec<_> = self.nodes.iter().copied().collect();
        nodes.sort_unstable();
        nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }

    /// True when every edge has weight 1 (plain BFS gives exact distances).
    pub fn is_unit_weight(&self) -> bool {
        self.out.values().flatten().all(|(_, w)| *w == 1)
    }

    /// Fraction of possible directed edges that are present.
    pub fn density(&self) -> f64 {
        let n = self.nodes.len();
        if n < 2 {
            return 0.0;
        }
        self.edge_count as f64 / (n * (n - 1)) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinkId;

    fn s(id: u64) -> SentenceId {
        SentenceId(id)
    }

    #[test]
    fn test_build_uses_direct_rows_only() {
        let rows = [
            Link::direct(LinkId(1), s(1), s(2)),
            Link::direct(LinkId(2), s(2), s(3)),
            Link::new(LinkId(3), s(1), s(3), 2),
        ];
        let g = Digraph::build(&rows);

        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert!(g.contains_edge(s(1), s(2)));
        assert!(!g.contains_edge(s(1), s(3)));
        assert!(g.is_unit_weight());
    }

    #[test]
    fn test_derived_row_endpoints_are_nodes() {
        let rows = [Link::new(LinkId(1), s(4), s(5), 3)];
        let g = Digraph::build(&rows);
        assert!(g.contains_node(s(4)));
        assert!(g.contains_node(s(5)));
        assert!(g.is_empty());
    }

    #[test]
    fn test_add_edge_is_idempotent() {
        let mut g = Digraph::new();
        g.add_link(s(1), s(2));
        g.add_link(s(1), s(2));
        assert_eq!(g.edge_count(), 1);

        g.add_edge(s(1), s(2), 5);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.neighbors(s(1)), &[(s(2), 5)]);
        assert!(!g.is_unit_weight());
    }

    #[test]
    fn test_remove_missing_edge_is_noop() {
        let mut g = Digraph::new();
        g.add_link(s(1), s(2));

        assert!(!g.remove_edge(s(2), s(1)));
        assert!(!g.remove_edge(s(9), s(1)));
        assert_eq!(g.edge_count(), 1);

        assert!(g.remove_edge(s(1), s(2)));
        assert!(!g.remove_edge(s(1), s(2)));
        assert_eq!(g.edge_count(), 0);
        // nodes stay after their edges are gone
        assert_eq!(g.node_count(), 2);
    }

    #[test]
    fn test_cycles_are_legal() {
        let mut g = Digraph::new();
        g.add_link(s(1), s(2));
        g.add_link(s(2), s(3));
        g.add_link(s(3), s(1));
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.nodes(), vec![s(1), s(2), s(3)]);
        assert!((g.density() - 0.5).abs() < f64::EPSILON);
    }
}
