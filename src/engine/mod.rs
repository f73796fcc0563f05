//! # Recomputation Engine
//!
//! Turns a batch of direct-link edits into the exact set of distance rows
//! that must change. Each call walks the same phases:
//!
//! ```text
//! Collecting → BeforeSnapshot → Mutating → AfterSnapshot → Diffing → Done
//! ```
//!
//! Graphs are built fresh per call from the caller's rows and dropped before
//! returning. The engine performs no I/O and keeps no state between calls,
//! so calls over disjoint neighborhoods may run in parallel. Calls whose
//! neighborhoods overlap must be serialized by the caller.

pub mod diff;

use hashbrown::HashMap;

use crate::backend::Backend;
use crate::config::EngineConfig;
use crate::graph::Digraph;
use crate::model::*;
use crate::{Error, Result};

pub use diff::{diff, RowIndex};

/// Recomputation phases, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Collecting,
    BeforeSnapshot,
    Mutating,
    AfterSnapshot,
    Diffing,
    Done,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Collecting => "collecting",
            Phase::BeforeSnapshot => "before_snapshot",
            Phase::Mutating => "mutating",
            Phase::AfterSnapshot => "after_snapshot",
            Phase::Diffing => "diffing",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Stateless recomputation entry point bound to one backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recomputer {
    backend: Backend,
}

impl Recomputer {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.backend())
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Recompute distances after applying `insertions` then `removals` to
    /// the direct links in `existing`.
    ///
    /// `existing` holds the selected rows of every level; level 1 rows form
    /// the graph and all rows supply ids for updates and deletes. The
    /// changeset covers the mutated pairs themselves too: an inserted edge
    /// shows up as a created (or updated) level 1 row and a removed edge's
    /// row shows up in `deleted`.
    ///
    /// For insertion-only calls every persisted derived row also enters the
    /// graph as an edge weighted by its level. Insertions only shorten
    /// paths, so a stored level stays a valid upper bound and a neighborhood
    /// cut short by the selector can never raise it. Removals invalidate
    /// those bounds, so calls carrying any removal use direct rows only and
    /// rely on the selector handing over the whole affected component.
    pub fn recompute(
        &self,
        existing: &[Link],
        insertions: &[Edge],
        removals: &[Edge],
    ) -> Result<Changeset> {
        let mut run = Run::new();
        if insertions.is_empty() && removals.is_empty() {
            run.advance(Phase::Done);
            return Ok(Changeset::new());
        }
        let rows = index_rows(existing)?;

        run.advance(Phase::BeforeSnapshot);
        let mut graph = Digraph::build(existing);
        if removals.is_empty() {
            for row in existing.iter().filter(|l| !l.is_direct()) {
                graph.add_edge(row.source, row.target, row.level);
            }
        }
        let before = self.backend.distances(&graph)?;

        run.advance(Phase::Mutating);
        for edge in insertions {
            if edge.is_self_loop() {
                tracing::warn!(sentence = %edge.source, "ignoring self link insertion");
                continue;
            }
            graph.add_link(edge.source, edge.target);
        }
        for edge in removals {
            if !graph.remove_edge(edge.source, edge.target) {
                tracing::warn!(
                    source = %edge.source,
                    target = %edge.target,
                    "removal of a direct link that is not in the subgraph"
                );
            }
        }

        run.advance(Phase::AfterSnapshot);
        let after = self.backend.distances(&graph)?;

        run.advance(Phase::Diffing);
        let cs = diff(&before, &after, &rows);

        run.advance(Phase::Done);
        tracing::debug!(
            backend = ?self.backend.kind(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            before = before.len(),
            after = after.len(),
            created = cs.created.len(),
            updated = cs.updated.len(),
            deleted = cs.deleted.len(),
            "recomputation finished"
        );
        Ok(cs)
    }

    /// Distances currently implied by the direct rows in `existing`, each
    /// tagged with the id of its persisted row when there is one.
    pub fn snapshot(&self, existing: &[Link]) -> Result<Vec<DistanceTuple>> {
        let rows = index_rows(existing)?;
        let ids: HashMap<Pair, LinkId> = rows.iter().map(|(pair, l)| (*pair, l.id)).collect();
        let distances = self.backend.distances(&Digraph::build(existing))?;
        Ok(distances.tuples(&ids))
    }

    /// Rebuild every derived distance from the direct rows in `existing` and
    /// diff against what is persisted. Used after imports or to repair a
    /// table that drifted.
    pub fn reconcile(&self, existing: &[Link]) -> Result<Changeset> {
        let mut run = Run::new();
        let rows = index_rows(existing)?;

        run.advance(Phase::BeforeSnapshot);
        let before = DistanceMap::from_links(existing);
        let graph = Digraph::build(existing);

        run.advance(Phase::AfterSnapshot);
        let after = self.backend.distances(&graph)?;

        run.advance(Phase::Diffing);
        let cs = diff(&before, &after, &rows);

        run.advance(Phase::Done);
        tracing::debug!(
            rows = existing.len(),
            changes = cs.len(),
            "reconcile finished"
        );
        Ok(cs)
    }
}

/// Recompute with the default (sparse) backend.
pub fn recompute(existing: &[Link], insertions: &[Edge], removals: &[Edge]) -> Result<Changeset> {
    Recomputer::default().recompute(existing, insertions, removals)
}

/// Tracks the current phase of one call.
struct Run {
    phase: Phase,
}

impl Run {
    fn new() -> Self {
        Self { phase: Phase::Collecting }
    }

    fn advance(&mut self, next: Phase) {
        debug_assert!(next > self.phase, "phase {next} after {}", self.phase);
        tracing::trace!(from = %self.phase, to = %next, "recompute phase");
        self.phase = next;
    }
}

/// Index rows by pair, rejecting data that breaks the table invariants.
fn index_rows(existing: &[Link]) -> Result<RowIndex> {
    let mut rows: RowIndex = HashMap::with_capacity(existing.len());
    for link in existing {
        if link.level == 0 {
            return Err(Error::InvalidLink(format!(
                "link {} ({}->{}) has level 0", link.id, link.source, link.target,
            )));
        }
        if link.source == link.target {
            return Err(Error::InvalidLink(format!(
                "link {} is a self link on sentence {}", link.id, link.source,
            )));
        }
        if let Some(prev) = rows.insert(link.pair(), *link) {
            if prev.id != link.id {
                return Err(Error::InvalidLink(format!(
                    "links {} and {} both connect {}->{}",
                    prev.id, link.id, link.source, link.target,
                )));
            }
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const A: SentenceId = SentenceId(1);
    const B: SentenceId = SentenceId(2);
    const C: SentenceId = SentenceId(3);

    fn s(id: u64) -> SentenceId {
        SentenceId(id)
    }

    fn e(source: SentenceId, target: SentenceId) -> Edge {
        Edge { source, target }
    }

    #[test]
    fn test_empty_mutations_are_noop() {
        let rows = [Link::direct(LinkId(1), A, B)];
        assert!(recompute(&rows, &[], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_single_insertion_shortens_path() {
        let rows = [
            Link::direct(LinkId(1), A, B),
            Link::direct(LinkId(2), B, C),
            Link::new(LinkId(3), A, C, 2),
        ];
        let cs = recompute(&rows, &[e(A, C)], &[]).unwrap();
        assert_eq!(cs, Changeset {
            created: vec![],
            updated: vec![Link::direct(LinkId(3), A, C)],
            deleted: vec![],
        });
    }

    #[test]
    fn test_single_insertion_without_prior_row() {
        let rows = [Link::direct(LinkId(1), A, B), Link::direct(LinkId(2), B, C)];
        let cs = recompute(&rows, &[e(A, C)], &[]).unwrap();
        assert_eq!(cs.created, vec![NewLink { source: A, target: C, level: 1 }]);
        assert!(cs.updated.is_empty());
        assert!(cs.deleted.is_empty());
    }

    #[test]
    fn test_removing_missing_edge_is_tolerated() {
        let rows = [Link::direct(LinkId(1), A, B)];
        let cs = recompute(&rows, &[], &[e(B, C)]).unwrap();
        assert!(cs.is_empty());
    }

    #[test]
    fn test_self_loop_insertion_ignored() {
        let rows = [Link::direct(LinkId(1), A, B)];
        assert!(recompute(&rows, &[e(A, A)], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let rows = [Link::direct(LinkId(1), A, B), Link::new(LinkId(2), A, B, 2)];
        assert!(matches!(recompute(&rows, &[e(B, C)], &[]), Err(Error::InvalidLink(_))));
    }

    #[test]
    fn test_zero_level_rejected() {
        let rows = [Link::new(LinkId(1), A, B, 0)];
        assert!(matches!(
            Recomputer::default().reconcile(&rows),
            Err(Error::InvalidLink(_)),
        ));
    }

    #[test]
    fn test_reconcile_fills_missing_derived_rows() {
        let rows = [
            Link::direct(LinkId(1), A, B),
            Link::direct(LinkId(2), B, C),
            Link::new(LinkId(3), C, A, 5),
        ];
        let cs = Recomputer::default().reconcile(&rows).unwrap();
        assert_eq!(cs, Changeset {
            created: vec![NewLink { source: A, target: C, level: 2 }],
            updated: vec![],
            deleted: vec![LinkId(3)],
        });
    }

    #[test]
    fn test_snapshot_tags_existing_rows() {
        let rows = [
            Link::direct(LinkId(1), A, B),
            Link::direct(LinkId(2), B, C),
        ];
        let tuples = Recomputer::default().snapshot(&rows).unwrap();
        assert_eq!(tuples, vec![
            DistanceTuple { source: A, target: B, level: 1, existing: Some(LinkId(1)) },
            DistanceTuple { source: A, target: C, level: 2, existing: None },
            DistanceTuple { source: B, target: C, level: 1, existing: Some(LinkId(2)) },
        ]);
    }

    #[test]
    fn test_truncated_insertion_keeps_stored_level() {
        // 1 -> 6 is stored at level 2 through a route the neighborhood
        // does not reach; the new 1 - 2 - 3 - 4 - 5 - 6 route is longer.
        let rows = [
            Link::direct(LinkId(1), s(1), s(2)),
            Link::direct(LinkId(2), s(2), s(3)),
            Link::direct(LinkId(3), s(4), s(5)),
            Link::direct(LinkId(4), s(5), s(6)),
            Link::new(LinkId(5), s(1), s(3), 2),
            Link::new(LinkId(6), s(4), s(6), 2),
            Link::new(LinkId(7), s(1), s(6), 2),
        ];
        let cs = recompute(&rows, &[e(s(3), s(4))], &[]).unwrap();
        assert!(cs.updated.is_empty());
        assert!(cs.deleted.is_empty());
        assert!(cs.created.contains(&NewLink { source: s(3), target: s(4), level: 1 }));
        assert!(cs.created.iter().all(|l| (l.source, l.target) != (s(1), s(6))));
    }

    #[test]
    fn test_stored_levels_shorten_new_routes() {
        // 1 -> 3 is known at level 2 but its route is not in the rows, so
        // only the stored level yields 1 -> 4 = 3.
        let rows = [
            Link::new(LinkId(1), s(1), s(3), 2),
        ];
        let cs = recompute(&rows, &[e(s(3), s(4))], &[]).unwrap();
        assert_eq!(cs.created, vec![
            NewLink { source: s(1), target: s(4), level: 3 },
            NewLink { source: s(3), target: s(4), level: 1 },
        ]);
    }

    #[test]
    fn test_phase_order_and_names() {
        assert!(Phase::Collecting < Phase::Done);
        assert_eq!(Phase::BeforeSnapshot.to_string(), "before_snapshot");
    }
}
