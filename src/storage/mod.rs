//! # Link Store Contract
//!
//! The engine owns no persisted state. Everything it reads comes from the
//! caller's link table and everything it produces is handed back as a
//! [`Changeset`](crate::model::Changeset). `LinkStore` is that contract.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryLinkStore` | `memory` | In-memory link table for testing/embedding |
//!
//! A SQL-backed store can use [`crate::export`] to render a changeset as
//! bulk statements for its own transaction.

pub mod memory;

use hashbrown::HashSet;

use crate::model::*;
use crate::Result;

pub use memory::MemoryLinkStore;

// ============================================================================
// LinkStore Trait
// ============================================================================

/// Read/write contract with the storage layer holding link rows.
///
/// Reads may return rows of any level; callers filter with
/// [`Link::is_direct`] where only direct links matter.
pub trait LinkStore: Send + Sync {
    /// Rows whose source is `node`.
    fn links_from(&self, node: SentenceId) -> Result<Vec<Link>>;

    /// Rows whose target is `node`.
    fn links_to(&self, node: SentenceId) -> Result<Vec<Link>>;

    /// The row for the ordered pair, if any.
    fn link_between(&self, source: SentenceId, target: SentenceId) -> Result<Option<Link>>;

    /// Every row in the store.
    fn all_links(&self) -> Result<Vec<Link>>;

    /// Apply a changeset. Must be all-or-nothing: either every created,
    /// updated and deleted row lands, or none do.
    fn apply(&self, changeset: &Changeset) -> Result<()>;

    /// Direct (level 1) rows touching `node` in either direction.
    ///
    /// Default: `links_from` + `links_to`, filtered.
    fn direct_links_touching(&self, node: SentenceId) -> Result<Vec<Link>> {
        let mut rows = self.links_from(node)?;
        rows.extend(self.links_to(node)?);
        rows.retain(|l| l.is_direct());
        Ok(rows)
    }

    /// Rows of any level whose endpoints both lie in `nodes`.
    ///
    /// Default: scans `links_from` of every node in the set.
    fn links_among(&self, nodes: &HashSet<SentenceId>) -> Result<Vec<Link>> {
        let mut rows = Vec::new();
        for node in nodes {
            rows.extend(
                self.links_from(*node)?
                    .into_iter()
                    .filter(|l| nodes.contains(&l.target)),
            );
        }
        Ok(rows)
    }

    /// Total number of rows.
    fn link_count(&self) -> Result<usize> {
        Ok(self.all_links()?.len())
    }
}
