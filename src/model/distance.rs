//! Shortest-path distance sets.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use super::{Link, LinkId, SentenceId};

/// Ordered sentence pair used as a distance key.
pub type Pair = (SentenceId, SentenceId);

/// One entry of a distance snapshot: the computed level for a pair and the
/// id of the persisted row for that pair, if storage already has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DistanceTuple {
    pub source: SentenceId,
    pub target: SentenceId,
    pub level: u32,
    pub existing: Option<LinkId>,
}

/// All-pairs shortest distances. Self pairs never appear; unreachable
/// pairs are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistanceMap {
    levels: HashMap<Pair, u32>,
}

impl DistanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { levels: HashMap::with_capacity(capacity) }
    }

    /// Distances as currently persisted, one entry per row.
    pub fn from_links<'a>(links: impl IntoIterator<Item = &'a Link>) -> Self {
        let mut map = Self::new();
        for link in links {
            map.insert(link.source, link.target, link.level);
        }
        map
    }

    /// Record a distance. Self pairs are ignored.
    pub fn insert(&mut self, source: SentenceId, target: SentenceId, level: u32) {
        if source != target {
            self.levels.insert((source, target), level);
        }
    }

    pub fn get(&self, source: SentenceId, target: SentenceId) -> Option<u32> {
        self.levels.get(&(source, target)).copied()
    }

    pub fn contains(&self, source: SentenceId, target: SentenceId) -> bool {
        self.levels.contains_key(&(source, target))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pair, u32)> + '_ {
        self.levels.iter().map(|(pair, level)| (*pair, *level))
    }

    /// Entries ordered by pair, for stable output.
    pub fn sorted(&self) -> Vec<(Pair, u32)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable();
        entries
    }

    /// First pair (in pair order) whose level differs between the two maps,
    /// with the level on each side.
    pub fn first_difference(&self, other: &DistanceMap) -> Option<(Pair, Option<u32>, Option<u32>)> {
        let mut pairs: Vec<Pair> = self.levels.keys()
            .chain(other.levels.keys())
            .copied()
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        pairs.into_iter()
            .map(|(s, t)| ((s, t), self.get(s, t), other.get(s, t)))
            .find(|(_, left, right)| left != right)
    }

    /// Attach persisted row ids to every distance.
    pub fn tuples(&self, ids: &HashMap<Pair, LinkId>) -> Vec<DistanceTuple> {
        self.sorted()
            .into_iter()
            .map(|((source, target), level)| DistanceTuple {
                source,
                target,
                level,
                existing: ids.get(&(source, target)).copied(),
            })
            .collect()
    }
}

impl FromIterator<(Pair, u32)> for DistanceMap {
    fn from_iter<I: IntoIterator<Item = (Pair, u32)>>(iter: I) -> Self {
        let mut map = Self::new();
        for ((source, target), level) in iter {
            map.insert(source, target, level);
        }
        map
    }
}
