//! In-memory link store.
//!
//! This is the reference implementation of `LinkStore`. All tables sit
//! behind one `RwLock`, so `apply()` is atomic with respect to readers:
//! a changeset is validated in full before anything is written.
//!
//! Use this store for:
//! - Testing the selector and engine end to end
//! - Embedding the engine in tools that keep the link table in memory
//! - Validating changesets before handing them to a real database

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use hashbrown::{HashMap, HashSet};
use parking_lot::RwLock;

use crate::model::*;
use crate::{Error, Result};
use super::LinkStore;

// ============================================================================
// MemoryLinkStore
// ============================================================================

/// In-memory link table.
#[derive(Clone)]
pub struct MemoryLinkStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    tables: RwLock<Tables>,
    next_link_id: AtomicU64,
}

#[derive(Default)]
struct Tables {
    rows: HashMap<LinkId, Link>,
    by_pair: HashMap<Pair, LinkId>,
    /// sentence → ids of rows with that sentence as source
    outgoing: HashMap<SentenceId, HashSet<LinkId>>,
    /// sentence → ids of rows with that sentence as target
    incoming: HashMap<SentenceId, HashSet<LinkId>>,
}

impl Tables {
    fn insert(&mut self, link: Link) {
        self.by_pair.insert(link.pair(), link.id);
        self.outgoing.entry(link.source).or_default().insert(link.id);
        self.incoming.entry(link.target).or_default().insert(link.id);
        self.rows.insert(link.id, link);
    }

    fn remove(&mut self, id: LinkId) -> Option<Link> {
        let link = self.rows.remove(&id)?;
        self.by_pair.remove(&link.pair());
        if let Some(ids) = self.outgoing.get_mut(&link.source) {
            ids.remove(&id);
        }
        if let Some(ids) = self.incoming.get_mut(&link.target) {
            ids.remove(&id);
        }
        Some(link)
    }

    fn collect(&self, ids: Option<&HashSet<LinkId>>) -> Vec<Link> {
        let mut rows: Vec<Link> = ids
            .into_iter()
            .flatten()
            .filter_map(|id| self.rows.get(id).copied())
            .collect();
        rows.sort_unstable_by_key(|l| l.id);
        rows
    }

    /// Check a changeset against the current tables without writing.
    fn validate(&self, changeset: &Changeset) -> Result<()> {
        let deleted: HashSet<LinkId> = changeset.deleted.iter().copied().collect();
        for id in &changeset.deleted {
            if !self.rows.contains_key(id) {
                return Err(Error::NotFound(format!("Link {id}")));
            }
        }
        for link in &changeset.updated {
            let current = self.rows.get(&link.id)
                .ok_or_else(|| Error::NotFound(format!("Link {}", link.id)))?;
            if deleted.contains(&link.id) {
                return Err(Error::ConstraintViolation(
                    format!("Link {} is both updated and deleted", link.id)
                ));
            }
            if current.pair() != link.pair() {
                return Err(Error::ConstraintViolation(format!(
                    "Link {} connects {}->{}, update names {}->{}",
                    link.id, current.source, current.target, link.source, link.target,
                )));
            }
            check_level(link.level)?;
        }
        let mut created = HashSet::new();
        for link in &changeset.created {
            check_level(link.level)?;
            if link.source == link.target {
                return Err(Error::InvalidLink(format!("self link on sentence {}", link.source)));
            }
            let pair = (link.source, link.target);
            let taken = self.by_pair.get(&pair).is_some_and(|id| !deleted.contains(id));
            if taken || !created.insert(pair) {
                return Err(Error::ConstraintViolation(
                    format!("Link {}->{} already exists", link.source, link.target)
                ));
            }
        }
        Ok(())
    }
}

fn check_level(level: u32) -> Result<()> {
    if level == 0 {
        return Err(Error::InvalidLink("level must be at least 1".into()));
    }
    Ok(())
}

impl Default for MemoryLinkStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                tables: RwLock::new(Tables::default()),
                next_link_id: AtomicU64::new(1),
            }),
        }
    }

    /// Seed a store with existing rows, keeping their ids.
    pub fn with_links(links: impl IntoIterator<Item = Link>) -> Result<Self> {
        let store = Self::new();
        {
            let mut tables = store.inner.tables.write();
            let mut max_id = 0;
            for link in links {
                check_level(link.level)?;
                if tables.rows.contains_key(&link.id) || tables.by_pair.contains_key(&link.pair()) {
                    return Err(Error::ConstraintViolation(format!(
                        "Link {} ({}->{}) duplicates an existing row",
                        link.id, link.source, link.target,
                    )));
                }
                max_id = max_id.max(link.id.0);
                tables.insert(link);
            }
            store.inner.next_link_id.store(max_id + 1, Ordering::Relaxed);
        }
        Ok(store)
    }

    /// Insert one row directly, bypassing the engine. Used for imports
    /// that are reconciled afterwards.
    pub fn insert(&self, source: SentenceId, target: SentenceId, level: u32) -> Result<LinkId> {
        check_level(level)?;
        let mut tables = self.inner.tables.write();
        if tables.by_pair.contains_key(&(source, target)) {
            return Err(Error::ConstraintViolation(
                format!("Link {source}->{target} already exists")
            ));
        }
        let id = LinkId(self.inner.next_link_id.fetch_add(1, Ordering::Relaxed));
        tables.insert(Link::new(id, source, target, level));
        Ok(id)
    }

    pub fn get(&self, id: LinkId) -> Option<Link> {
        self.inner.tables.read().rows.get(&id).copied()
    }

    /// Persisted level for a pair.
    pub fn level(&self, source: SentenceId, target: SentenceId) -> Option<u32> {
        let tables = self.inner.tables.read();
        let id = tables.by_pair.get(&(source, target))?;
        tables.rows.get(id).map(|l| l.level)
    }

    /// Persisted rows as a distance map.
    pub fn distances(&self) -> DistanceMap {
        DistanceMap::from_links(self.inner.tables.read().rows.values())
    }
}

// ============================================================================
// LinkStore impl
// ============================================================================

impl LinkStore for MemoryLinkStore {
    fn links_from(&self, node: SentenceId) -> Result<Vec<Link>> {
        let tables = self.inner.tables.read();
        Ok(tables.collect(tables.outgoing.get(&node)))
    }

    fn links_to(&self, node: SentenceId) -> Result<Vec<Link>> {
        let tables = self.inner.tables.read();
        Ok(tables.collect(tables.incoming.get(&node)))
    }

    fn link_between(&self, source: SentenceId, target: SentenceId) -> Result<Option<Link>> {
        let tables = self.inner.tables.read();
        Ok(tables.by_pair.get(&(source, target)).and_then(|id| tables.rows.get(id).copied()))
    }

    fn all_links(&self) -> Result<Vec<Link>> {
        let mut rows: Vec<Link> = self.inner.tables.read().rows.values().copied().collect();
        rows.sort_unstable_by_key(|l| l.id);
        Ok(rows)
    }

    fn apply(&self, changeset: &Changeset) -> Result<()> {
        let mut tables = self.inner.tables.write();
        tables.validate(changeset)?;

        for id in &changeset.deleted {
            tables.remove(*id);
        }
        for link in &changeset.updated {
            if let Some(row) = tables.rows.get_mut(&link.id) {
                row.level = link.level;
            }
        }
        for new in &changeset.created {
            let id = LinkId(self.inner.next_link_id.fetch_add(1, Ordering::Relaxed));
            tables.insert(Link::new(id, new.source, new.target, new.level));
        }

        tracing::debug!(
            created = changeset.created.len(),
            updated = changeset.updated.len(),
            deleted = changeset.deleted.len(),
            rows = tables.rows.len(),
            "changeset applied"
        );
        Ok(())
    }

    fn link_count(&self) -> Result<usize> {
        Ok(self.inner.tables.read().rows.len())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn s(id: u64) -> SentenceId {
        SentenceId(id)
    }

    #[test]
    fn test_insert_and_lookup() {
        let store = MemoryLinkStore::new();
        let id = store.insert(s(1), s(2), 1).unwrap();

        assert_eq!(store.get(id).unwrap().pair(), (s(1), s(2)));
        assert_eq!(store.level(s(1), s(2)), Some(1));
        assert_eq!(store.links_from(s(1)).unwrap().len(), 1);
        assert_eq!(store.links_to(s(2)).unwrap().len(), 1);
        assert!(store.links_to(s(1)).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let store = MemoryLinkStore::new();
        store.insert(s(1), s(2), 1).unwrap();
        assert!(store.insert(s(1), s(2), 3).is_err());
        // the reverse direction is a different row
        assert!(store.insert(s(2), s(1), 1).is_ok());
    }

    #[test]
    fn test_with_links_keeps_ids() {
        let store = MemoryLinkStore::with_links([
            Link::direct(LinkId(10), s(1), s(2)),
            Link::new(LinkId(42), s(1), s(3), 2),
        ]).unwrap();

        assert_eq!(store.link_between(s(1), s(3)).unwrap().unwrap().id, LinkId(42));
        let next = store.insert(s(3), s(4), 1).unwrap();
        assert_eq!(next, LinkId(43));
    }

    #[test]
    fn test_apply_changeset() {
        let store = MemoryLinkStore::with_links([
            Link::direct(LinkId(1), s(1), s(2)),
            Link::new(LinkId(2), s(1), s(3), 3),
            Link::new(LinkId(3), s(2), s(3), 2),
        ]).unwrap();

        let cs = Changeset {
            created: vec![NewLink { source: s(1), target: s(4), level: 2 }],
            updated: vec![Link::new(LinkId(2), s(1), s(3), 2)],
            deleted: vec![LinkId(3)],
        };
        store.apply(&cs).unwrap();

        assert_eq!(store.link_count().unwrap(), 3);
        assert_eq!(store.level(s(1), s(3)), Some(2));
        assert_eq!(store.level(s(1), s(4)), Some(2));
        assert_eq!(store.level(s(2), s(3)), None);
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let store = MemoryLinkStore::with_links([
            Link::direct(LinkId(1), s(1), s(2)),
        ]).unwrap();

        let cs = Changeset {
            created: vec![NewLink { source: s(2), target: s(1), level: 1 }],
            updated: vec![],
            deleted: vec![LinkId(99)],
        };
        assert!(store.apply(&cs).is_err());
        assert_eq!(store.link_count().unwrap(), 1);
        assert_eq!(store.level(s(2), s(1)), None);
    }

    #[test]
    fn test_apply_rejects_mismatched_update() {
        let store = MemoryLinkStore::with_links([
            Link::direct(LinkId(1), s(1), s(2)),
        ]).unwrap();
        let cs = Changeset {
            created: vec![],
            updated: vec![Link::new(LinkId(1), s(2), s(1), 2)],
            deleted: vec![],
        };
        assert!(matches!(store.apply(&cs), Err(Error::ConstraintViolation(_))));
    }

    #[test]
    fn test_links_among() {
        let store = MemoryLinkStore::with_links([
            Link::direct(LinkId(1), s(1), s(2)),
            Link::direct(LinkId(2), s(2), s(3)),
            Link::new(LinkId(3), s(1), s(3), 2),
        ]).unwrap();

        let nodes: HashSet<SentenceId> = [s(1), s(2)].into_iter().collect();
        let rows = store.links_among(&nodes).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, LinkId(1));
    }
}
