//! Link rows (persisted translation distances) and requested edge mutations.

use serde::{Deserialize, Serialize};
use super::SentenceId;

/// Level of a direct, user-authored link.
pub const DIRECT_LEVEL: u32 = 1;

/// Opaque identifier of a persisted link row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(pub u64);

impl std::fmt::Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted link row: `source -[level]-> target`.
///
/// Rows are directional. The storage layer keeps at most one row per
/// ordered `(source, target)` pair and `level` is always `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub source: SentenceId,
    pub target: SentenceId,
    pub level: u32,
}

impl Link {
    pub fn new(id: LinkId, source: SentenceId, target: SentenceId, level: u32) -> Self {
        Self { id, source, target, level }
    }

    /// Direct (level 1) row.
    pub fn direct(id: LinkId, source: SentenceId, target: SentenceId) -> Self {
        Self::new(id, source, target, DIRECT_LEVEL)
    }

    pub fn is_direct(&self) -> bool {
        self.level == DIRECT_LEVEL
    }

    pub fn pair(&self) -> (SentenceId, SentenceId) {
        (self.source, self.target)
    }

    /// The "other" end of the link from the given sentence.
    pub fn other_end(&self, from: SentenceId) -> Option<SentenceId> {
        if from == self.source { Some(self.target) }
        else if from == self.target { Some(self.source) }
        else { None }
    }
}

/// A distance row that does not exist in storage yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NewLink {
    pub source: SentenceId,
    pub target: SentenceId,
    pub level: u32,
}

/// A requested direct-link mutation (insertion or removal) between two
/// sentences. Carries no id and no level: mutations always concern
/// level 1 edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: SentenceId,
    pub target: SentenceId,
}

impl Edge {
    pub fn new(source: impl Into<SentenceId>, target: impl Into<SentenceId>) -> Self {
        Self { source: source.into(), target: target.into() }
    }

    /// The same edge pointing the other way.
    pub fn reversed(self) -> Self {
        Self { source: self.target, target: self.source }
    }

    pub fn endpoints(&self) -> [SentenceId; 2] {
        [self.source, self.target]
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

impl From<(SentenceId, SentenceId)> for Edge {
    fn from((source, target): (SentenceId, SentenceId)) -> Self {
        Self { source, target }
    }
}

impl From<(u64, u64)> for Edge {
    fn from((source, target): (u64, u64)) -> Self {
        Self::new(source, target)
    }
}
