//! Property tests: every distance backend agrees on every graph.

use proptest::prelude::*;
use sentence_links::backend::{cross_check, IndexMap};
use sentence_links::{
    recompute, DenseBackend, Digraph, DistanceBackend, Link, LinkId, SentenceId, SparseBackend,
};

/// Random graph on sparse ids drawn from a small pool, so clusters are
/// both disconnected and cyclic often enough.
fn graph_strategy(weighted: bool) -> impl Strategy<Value = Digraph> {
    let max_weight = if weighted { 6u32 } else { 1 };
    prop::collection::vec((0u64..16, 0u64..16, 1u32..=max_weight), 0..48).prop_map(|edges| {
        let mut g = Digraph::new();
        for (a, b, w) in edges {
            if a != b {
                g.add_edge(SentenceId(a * 1_000 + 7), SentenceId(b * 1_000 + 7), w);
            }
        }
        g
    })
}

proptest! {
    #[test]
    fn sparse_and_dense_agree_on_unit_graphs(g in graph_strategy(false)) {
        let sparse = SparseBackend.all_pairs_shortest_distances(&g);
        let dense = DenseBackend.all_pairs_shortest_distances(&g);
        prop_assert_eq!(sparse, dense);
    }

    #[test]
    fn sparse_and_dense_agree_on_weighted_graphs(g in graph_strategy(true)) {
        prop_assert!(cross_check(&SparseBackend, &DenseBackend, &g).is_ok());
    }

    #[test]
    fn distances_exclude_self_pairs_and_stay_positive(g in graph_strategy(false)) {
        let d = SparseBackend.all_pairs_shortest_distances(&g);
        for ((source, target), level) in d.iter() {
            prop_assert_ne!(source, target);
            prop_assert!(level >= 1);
            prop_assert!(level as usize <= g.node_count());
        }
    }

    #[test]
    fn direct_edges_are_level_one(g in graph_strategy(false)) {
        let d = DenseBackend.all_pairs_shortest_distances(&g);
        for node in g.nodes() {
            for &(target, _) in g.neighbors(node) {
                prop_assert_eq!(d.get(node, target), Some(1));
            }
        }
    }

    #[test]
    fn index_map_round_trips(g in graph_strategy(false)) {
        let map = IndexMap::from_graph(&g);
        prop_assert_eq!(map.len(), g.node_count());
        for node in g.nodes() {
            let i = map.index_of(node).unwrap();
            prop_assert_eq!(map.id_at(i), Some(node));
        }
    }

    #[test]
    fn empty_edit_is_idempotent(
        edges in prop::collection::vec((0u64..10, 0u64..10), 0..30),
    ) {
        let mut rows = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for (a, b) in edges {
            if a != b && seen.insert((a, b)) {
                rows.push(Link::direct(LinkId(rows.len() as u64 + 1), SentenceId(a), SentenceId(b)));
            }
        }
        prop_assert!(recompute(&rows, &[], &[]).unwrap().is_empty());
    }
}

#[test]
fn empty_graph_gives_empty_map() {
    let g = Digraph::new();
    assert!(SparseBackend.all_pairs_shortest_distances(&g).is_empty());
    assert!(DenseBackend.all_pairs_shortest_distances(&g).is_empty());
}
