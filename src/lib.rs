//! # sentence-links — Incremental Translation Distances
//!
//! Keeps the translation-distance table of a multilingual sentence corpus
//! up to date. Users author *direct* links (level 1) between sentences;
//! every other row is a *derived* link whose level is the shortest path
//! over direct links. When direct links change, only the affected
//! neighborhood is recomputed and the exact set of rows to create, update
//! and delete is returned.
//!
//! ## Design Principles
//!
//! 1. **Stateless engine**: graphs are rebuilt per call from the rows the
//!    caller supplies, and dropped before returning
//! 2. **Trait at the storage seam**: `LinkStore` is the contract with
//!    whatever holds the link table
//! 3. **Explicit backends**: the shortest-path strategy is a tagged variant
//!    chosen from configuration
//! 4. **Changesets, not writes**: the engine never persists anything itself
//!
//! ## Quick Start
//!
//! ```rust
//! use sentence_links::{Corpus, SentenceId};
//!
//! # fn example() -> sentence_links::Result<()> {
//! let corpus = Corpus::open_memory()?;
//!
//! // "Hello" (1) ↔ "Bonjour" (2) ↔ "Hallo" (3)
//! corpus.link(SentenceId(1), SentenceId(2))?;
//! corpus.link(SentenceId(2), SentenceId(3))?;
//!
//! // 1 and 3 are now indirect translations at level 2
//! assert_eq!(corpus.store().level(SentenceId(1), SentenceId(3)), Some(2));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Backends
//!
//! | Backend | Config | Description |
//! |---------|--------|-------------|
//! | Sparse | `"sparse"` (default) | BFS per source, any topology |
//! | Dense | `"dense"` | Index remap + distance matrix, small dense clusters |
//! | Auto | `"auto"` | Dense when the cluster is small and dense enough |
//! | Verified | `"verified"` | Runs both, fails if they disagree |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod graph;
pub mod backend;
pub mod selector;
pub mod engine;
pub mod storage;
pub mod config;
pub mod export;

use parking_lot::Mutex;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    SentenceId, LinkId, Link, NewLink, Edge, Changeset,
    DistanceMap, DistanceTuple, DIRECT_LEVEL,
};

// ============================================================================
// Re-exports: Engine
// ============================================================================

pub use backend::{Backend, BackendKind, DistanceBackend, SparseBackend, DenseBackend};
pub use config::EngineConfig;
pub use engine::{recompute, Recomputer};
pub use graph::Digraph;
pub use selector::{select, Selection};

// ============================================================================
// Re-exports: Storage
// ============================================================================

pub use storage::{LinkStore, MemoryLinkStore};

// ============================================================================
// Top-level Corpus handle
// ============================================================================

/// The primary entry point. A `Corpus` wraps a link store and keeps its
/// distance rows consistent as direct links are added and removed.
///
/// `link` / `unlink` and their bulk variants pair every edit in both
/// directions. The raw [`Corpus::edit`] call takes directed edges as given.
pub struct Corpus<S: LinkStore> {
    store: S,
    config: EngineConfig,
    recomputer: Recomputer,
    /// Serializes select → recompute → apply cycles. Overlapping cycles
    /// would otherwise race on the same rows.
    write_lock: Mutex<()>,
}

impl<S: LinkStore> Corpus<S> {
    /// Create a corpus over the given store.
    pub fn with_store(store: S, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let recomputer = Recomputer::from_config(&config);
        Ok(Self { store, config, recomputer, write_lock: Mutex::new(()) })
    }

    /// Link two sentences as direct translations of each other.
    pub fn link(&self, a: SentenceId, b: SentenceId) -> Result<Changeset> {
        self.bulk_link(a, &[b])
    }

    /// Remove the direct link between two sentences.
    pub fn unlink(&self, a: SentenceId, b: SentenceId) -> Result<Changeset> {
        self.bulk_unlink(a, &[b])
    }

    /// Link one sentence to many in a single recomputation.
    pub fn bulk_link(&self, source: SentenceId, targets: &[SentenceId]) -> Result<Changeset> {
        let edges = paired(source, targets);
        self.edit(&edges, &[])
    }

    /// Unlink one sentence from many in a single recomputation.
    pub fn bulk_unlink(&self, source: SentenceId, targets: &[SentenceId]) -> Result<Changeset> {
        let edges = paired(source, targets);
        self.edit(&[], &edges)
    }

    /// Apply directed insertions and removals and persist the resulting
    /// changeset. Returns what was applied.
    pub fn edit(&self, insertions: &[Edge], removals: &[Edge]) -> Result<Changeset> {
        let _guard = self.write_lock.lock();
        let changeset = self.compute(insertions, removals)?;
        if !changeset.is_empty() {
            self.store.apply(&changeset)?;
        }
        Ok(changeset)
    }

    /// Compute the changeset for an edit without applying it.
    pub fn preview(&self, insertions: &[Edge], removals: &[Edge]) -> Result<Changeset> {
        let _guard = self.write_lock.lock();
        self.compute(insertions, removals)
    }

    /// Recompute every derived row from the direct links in the store and
    /// apply the difference.
    pub fn reconcile(&self) -> Result<Changeset> {
        let _guard = self.write_lock.lock();
        let rows = self.store.all_links()?;
        self.check_size(0, &rows)?;
        let changeset = self.recomputer.reconcile(&rows)?;
        if !changeset.is_empty() {
            self.store.apply(&changeset)?;
        }
        tracing::info!(rows = rows.len(), changes = changeset.len(), "corpus reconciled");
        Ok(changeset)
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn compute(&self, insertions: &[Edge], removals: &[Edge]) -> Result<Changeset> {
        let selection = selector::select(&self.store, insertions, removals, &self.config)?;
        self.check_size(selection.nodes.len(), &selection.links)?;
        self.recomputer.recompute(&selection.links, insertions, removals)
    }

    fn check_size(&self, nodes: usize, links: &[Link]) -> Result<()> {
        let Some(limit) = self.config.max_subgraph_nodes else {
            return Ok(());
        };
        let nodes = nodes.max(Digraph::build(links).node_count());
        if nodes > limit {
            tracing::warn!(nodes, limit, "refusing oversized subgraph");
            return Err(Error::SubgraphTooLarge { nodes, limit });
        }
        Ok(())
    }
}

/// In-memory corpus for testing and embedding.
impl Corpus<MemoryLinkStore> {
    pub fn open_memory() -> Result<Self> {
        Self::with_store(MemoryLinkStore::new(), EngineConfig::default())
    }
}

/// Both directions of every `source`–`target` pair.
fn paired(source: SentenceId, targets: &[SentenceId]) -> Vec<Edge> {
    targets.iter()
        .map(|&target| Edge { source, target })
        .flat_map(|edge| [edge, edge.reversed()])
        .collect()
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Distance backends disagree ({left} vs {right}): {detail}")]
    BackendDisagreement {
        left: &'static str,
        right: &'static str,
        detail: String,
    },

    #[error("Invalid link: {0}")]
    InvalidLink(String),

    #[error("Subgraph too large: {nodes} sentences exceeds limit of {limit}")]
    SubgraphTooLarge { nodes: usize, limit: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
