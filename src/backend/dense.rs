//! Dense backend: contiguous index remap + distance matrix.
//!
//! Suited to small, tightly linked clusters where sentence ids are sparse
//! but the cluster itself is nearly complete. The id ↔ index table is built
//! once per call and dropped with the matrix.

use hashbrown::HashMap;

use crate::graph::Digraph;
use crate::model::{DistanceMap, SentenceId};
use super::DistanceBackend;

const UNREACHABLE: u32 = u32::MAX;

/// Bidirectional lookup between sentence ids and matrix indices.
#[derive(Debug, Clone, Default)]
pub struct IndexMap {
    ids: Vec<SentenceId>,
    index: HashMap<SentenceId, usize>,
}

impl IndexMap {
    /// Assign indices in ascending id order.
    pub fn from_graph(graph: &Digraph) -> Self {
        let ids = graph.nodes();
        let index = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        Self { ids, index }
    }

    pub fn index_of(&self, id: SentenceId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn id_at(&self, index: usize) -> Option<SentenceId> {
        self.ids.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Row-major `n × n` matrix of path lengths.
struct Matrix {
    n: usize,
    cells: Vec<u32>,
}

impl Matrix {
    fn new(n: usize) -> Self {
        let mut cells = vec![UNREACHABLE; n * n];
        for i in 0..n {
            cells[i * n + i] = 0;
        }
        Self { n, cells }
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> u32 {
        self.cells[i * self.n + j]
    }

    #[inline]
    fn relax(&mut self, i: usize, j: usize, candidate: u32) {
        let cell = &mut self.cells[i * self.n + j];
        if candidate < *cell {
            *cell = candidate;
        }
    }
}

/// Matrix backend (Floyd–Warshall over the remapped cluster).
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseBackend;

impl DenseBackend {
    pub fn new() -> Self {
        Self
    }
}

impl DistanceBackend for DenseBackend {
    fn name(&self) -> &'static str {
        "dense"
    }

    fn all_pairs_shortest_distances(&self, graph: &Digraph) -> DistanceMap {
        if graph.is_empty() {
            return DistanceMap::new();
        }
        let map = IndexMap::from_graph(graph);
        let n = map.len();
        let mut m = Matrix::new(n);

        for i in 0..n {
            let Some(source) = map.id_at(i) else { continue };
            for &(target, weight) in graph.neighbors(source) {
                if let Some(j) = map.index_of(target) {
                    if i != j {
                        m.relax(i, j, weight);
                    }
                }
            }
        }

        for k in 0..n {
            for i in 0..n {
                let ik = m.get(i, k);
                if ik == UNREACHABLE {
                    continue;
                }
                for j in 0..n {
                    let kj = m.get(k, j);
                    if kj != UNREACHABLE {
                        m.relax(i, j, ik.saturating_add(kj));
                    }
                }
            }
        }

        let mut out = DistanceMap::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                let level = m.get(i, j);
                if i == j || level == UNREACHABLE {
                    continue;
                }
                if let (Some(source), Some(target)) = (map.id_at(i), map.id_at(j)) {
                    out.insert(source, target, level);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(id: u64) -> SentenceId {
        SentenceId(id)
    }

    #[test]
    fn test_index_map_is_bidirectional() {
        let mut g = Digraph::new();
        g.add_link(s(900), s(7));
        g.add_link(s(7), s(42));

        let map = IndexMap::from_graph(&g);
        assert_eq!(map.len(), 3);
        assert_eq!(map.index_of(s(7)), Some(0));
        assert_eq!(map.index_of(s(900)), Some(2));
        assert_eq!(map.id_at(1), Some(s(42)));
        assert_eq!(map.index_of(s(1)), None);
    }

    #[test]
    fn test_clique_distances() {
        let mut g = Digraph::new();
        for a in 1..=4 {
            for b in 1..=4 {
                if a != b {
                    g.add_link(s(a * 100), s(b * 100));
                }
            }
        }
        let d = DenseBackend.all_pairs_shortest_distances(&g);
        assert_eq!(d.len(), 12);
        assert!(d.iter().all(|(_, level)| level == 1));
    }

    #[test]
    fn test_disconnected_components() {
        let mut g = Digraph::new();
        g.add_link(s(1), s(2));
        g.add_link(s(10), s(11));
        let d = DenseBackend.all_pairs_shortest_distances(&g);
        assert_eq!(d.len(), 2);
        assert_eq!(d.get(s(1), s(11)), None);
    }
}
