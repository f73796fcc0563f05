//! Changeset — how persisted distance rows must change after an edit.

use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};
use super::{Link, LinkId, NewLink, SentenceId};

/// The created / updated / deleted triple emitted by a recomputation.
///
/// The caller applies all three lists inside one storage transaction.
/// Lists are kept sorted (`created` and `updated` by pair, `deleted` by id)
/// so identical inputs always yield identical changesets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changeset {
    /// New rows to insert.
    pub created: Vec<NewLink>,
    /// Existing rows whose `level` must be overwritten.
    pub updated: Vec<Link>,
    /// Existing rows to remove.
    pub deleted: Vec<LinkId>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Total number of row operations.
    pub fn len(&self) -> usize {
        self.created.len() + self.updated.len() + self.deleted.len()
    }

    /// Sentences whose rows are created or updated by this changeset.
    /// Deleted rows are referenced by id only and do not contribute.
    pub fn touched_nodes(&self) -> BTreeSet<SentenceId> {
        self.created.iter()
            .flat_map(|l| [l.source, l.target])
            .chain(self.updated.iter().flat_map(|l| [l.source, l.target]))
            .collect()
    }

    pub(crate) fn normalize(&mut self) {
        self.created.sort_unstable_by_key(|l| (l.source, l.target));
        self.updated.sort_unstable_by_key(|l| (l.source, l.target));
        self.deleted.sort_unstable();
        self.deleted.dedup();
    }
}
