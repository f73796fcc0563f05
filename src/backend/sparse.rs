//! Sparse backend: one single-source search per node.
//!
//! BFS when every edge has unit weight (the normal case, since only direct
//! links become edges), Dijkstra otherwise. O(V·(V+E)) for unit weights,
//! which is fine for the hop-bounded neighborhoods the selector hands us.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use hashbrown::HashMap;

use crate::graph::Digraph;
use crate::model::{DistanceMap, SentenceId};
use super::DistanceBackend;

/// Adjacency-list backend for arbitrary topologies.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseBackend;

impl SparseBackend {
    pub fn new() -> Self {
        Self
    }
}

impl DistanceBackend for SparseBackend {
    fn name(&self) -> &'static str {
        "sparse"
    }

    fn all_pairs_shortest_distances(&self, graph: &Digraph) -> DistanceMap {
        let mut out = DistanceMap::new();
        if graph.is_empty() {
            return out;
        }
        let unit = graph.is_unit_weight();
        for source in graph.nodes() {
            let reached = if unit { bfs(graph, source) } else { dijkstra(graph, source) };
            for (target, level) in reached {
                out.insert(source, target, level);
            }
        }
        out
    }
}

fn bfs(graph: &Digraph, source: SentenceId) -> HashMap<SentenceId, u32> {
    let mut dist = HashMap::new();
    let mut queue = VecDeque::new();
    dist.insert(source, 0u32);
    queue.push_back(source);

    while let Some(node) = queue.pop_front() {
        let next = dist[&node] + 1;
        for &(neighbor, _) in graph.neighbors(node) {
            if !dist.contains_key(&neighbor) {
                dist.insert(neighbor, next);
                queue.push_back(neighbor);
            }
        }
    }
    dist
}

fn dijkstra(graph: &Digraph, source: SentenceId) -> HashMap<SentenceId, u32> {
    let mut dist: HashMap<SentenceId, u32> = HashMap::new();
    let mut heap = BinaryHeap::new();
    dist.insert(source, 0);
    heap.push(Reverse((0u32, source)));

    while let Some(Reverse((d, node))) = heap.pop() {
        if dist.get(&node).is_some_and(|&best| d > best) {
            continue;
        }
        for &(neighbor, weight) in graph.neighbors(node) {
            let candidate = d.saturating_add(weight);
            let better = dist.get(&neighbor).is_none_or(|&best| candidate < best);
            if better {
                dist.insert(neighbor, candidate);
                heap.push(Reverse((candidate, neighbor)));
            }
        }
    }
    dist
}
