//! # Subgraph Selector
//!
//! Picks the rows a recomputation needs: the direct links within a few hops
//! of every mutated endpoint, plus every persisted row (of any level) whose
//! two ends fall inside that neighborhood, so the engine can find the ids
//! of distances it has to update or delete.
//!
//! Insertions only shorten paths, so they get a hop-bounded neighborhood:
//! with the default radius of 2 the selection covers every direct neighbor
//! of `a` and `b` together with their own neighbors. Batches of several
//! edits widen the radius (see [`hops_for`]), since chaining two new edges
//! can route paths further out than either edit alone would.
//!
//! A removal can lengthen a path arbitrarily far from the removed edge, so
//! any call carrying a removal walks the whole connected component of the
//! mutated endpoints. The walk stops once it passes
//! `EngineConfig::max_subgraph_nodes`, leaving the oversized selection for
//! the caller to refuse.

use std::collections::{BTreeMap, BTreeSet};
use hashbrown::HashSet;

use crate::config::EngineConfig;
use crate::model::*;
use crate::storage::LinkStore;
use crate::Result;

/// Rows selected for one recomputation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Selected rows, de-duplicated and ordered by id.
    pub links: Vec<Link>,
    /// Every sentence in the neighborhood, mutated endpoints included.
    pub nodes: BTreeSet<SentenceId>,
    /// Hops walked from the mutated endpoints.
    pub hops: usize,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.nodes.is_empty()
    }

    pub fn direct_links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(|l| l.is_direct())
    }
}

/// Neighborhood radius for a call carrying `mutations` edits.
///
/// One edit uses `base`. Each further edit in the same batch adds another
/// `base` hops, capped at `cap` (never below `base`).
pub fn hops_for(mutations: usize, base: usize, cap: usize) -> usize {
    if mutations <= 1 {
        return base;
    }
    base.saturating_mul(mutations).min(cap.max(base))
}

/// Select the rows needed to recompute the given insertions and removals.
pub fn select<S>(
    store: &S,
    insertions: &[Edge],
    removals: &[Edge],
    config: &EngineConfig,
) -> Result<Selection>
where
    S: LinkStore + ?Sized,
{
    let mutations = insertions.len() + removals.len();
    if mutations == 0 {
        return Ok(Selection::default());
    }
    let radius = removals.is_empty()
        .then(|| hops_for(mutations, config.hops, config.max_batch_hops));

    let seeds: Vec<SentenceId> = insertions.iter()
        .chain(removals)
        .flat_map(Edge::endpoints)
        .collect();

    let mut selected: BTreeMap<LinkId, Link> = BTreeMap::new();
    let mut visited: HashSet<SentenceId> = seeds.iter().copied().collect();
    let mut frontier: Vec<SentenceId> = visited.iter().copied().collect();
    frontier.sort_unstable();

    let mut hops = 0;
    while radius.is_none_or(|r| hops < r) {
        if radius.is_none() && config.max_subgraph_nodes.is_some_and(|limit| visited.len() > limit) {
            tracing::debug!(nodes = visited.len(), "component walk stopped at the node limit");
            break;
        }
        hops += 1;
        let mut next = Vec::new();
        for node in &frontier {
            for link in store.direct_links_touching(*node)? {
                if let Some(other) = link.other_end(*node) {
                    if visited.insert(other) {
                        next.push(other);
                    }
                }
                selected.insert(link.id, link);
            }
        }
        if next.is_empty() {
            break;
        }
        next.sort_unstable();
        frontier = next;
    }

    for link in store.links_among(&visited)? {
        selected.insert(link.id, link);
    }
    for removal in removals {
        if let Some(link) = store.link_between(removal.source, removal.target)? {
            if link.is_direct() {
                selected.insert(link.id, link);
            }
        }
    }

    let selection = Selection {
        links: selected.into_values().collect(),
        nodes: visited.into_iter().collect(),
        hops,
    };
    tracing::debug!(
        mutations,
        hops,
        component = radius.is_none(),
        nodes = selection.nodes.len(),
        links = selection.links.len(),
        "subgraph selected"
    );
    Ok(selection)
}
