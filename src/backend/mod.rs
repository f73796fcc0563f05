//! # Distance Backends
//!
//! `DistanceBackend` is the contract between the recomputation engine and
//! a shortest-path strategy. Strategies only compute path *lengths*; paths
//! themselves are never persisted.
//!
//! ## Implementations
//!
//! | Backend | Module | Description |
//! |---------|--------|-------------|
//! | `SparseBackend` | `sparse` | BFS / Dijkstra per source, any topology |
//! | `DenseBackend` | `dense` | index remap + Floyd–Warshall, small dense clusters |
//!
//! The engine does not call a strategy directly; it goes through
//! [`Backend`], a tagged variant chosen once from configuration.

pub mod sparse;
pub mod dense;

use serde::{Deserialize, Serialize};

use crate::graph::Digraph;
use crate::model::DistanceMap;
use crate::{Error, Result};

pub use sparse::SparseBackend;
pub use dense::{DenseBackend, IndexMap};

// ============================================================================
// DistanceBackend Trait
// ============================================================================

/// All-pairs shortest-path lengths over a [`Digraph`].
///
/// Every implementation must return identical maps for identical graphs:
/// no self pairs, unreachable pairs absent, empty graph → empty map.
pub trait DistanceBackend: Send + Sync {
    /// Short name used in logs and disagreement reports.
    fn name(&self) -> &'static str;

    fn all_pairs_shortest_distances(&self, graph: &Digraph) -> DistanceMap;
}

// ============================================================================
// Backend selection
// ============================================================================

/// Which strategy to run, as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Always the adjacency-list backend.
    #[default]
    Sparse,
    /// Always the matrix backend.
    Dense,
    /// Dense for small dense clusters, sparse otherwise.
    Auto,
    /// Run both and fail on any disagreement.
    Verified,
}

/// Thresholds used by [`BackendKind::Auto`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoThresholds {
    /// Largest node count the dense backend is chosen for.
    pub dense_max_nodes: usize,
    /// Minimum edge density for the dense backend.
    pub dense_min_density: f64,
}

impl Default for AutoThresholds {
    fn default() -> Self {
        Self { dense_max_nodes: 256, dense_min_density: 0.25 }
    }
}

/// Strategy resolved at construction time.
#[derive(Debug, Clone, Copy)]
pub enum Backend {
    Sparse(SparseBackend),
    Dense(DenseBackend),
    Auto(AutoThresholds),
    Verified,
}

impl Default for Backend {
    fn default() -> Self {
        Backend::Sparse(SparseBackend)
    }
}

impl Backend {
    pub fn from_kind(kind: BackendKind, thresholds: AutoThresholds) -> Self {
        match kind {
            BackendKind::Sparse => Backend::Sparse(SparseBackend),
            BackendKind::Dense => Backend::Dense(DenseBackend),
            BackendKind::Auto => Backend::Auto(thresholds),
            BackendKind::Verified => Backend::Verified,
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Sparse(_) => BackendKind::Sparse,
            Backend::Dense(_) => BackendKind::Dense,
            Backend::Auto(_) => BackendKind::Auto,
            Backend::Verified => BackendKind::Verified,
        }
    }

    /// Compute all-pairs distances with the configured strategy.
    ///
    /// Only [`Backend::Verified`] can fail, and only when the two strategies
    /// disagree, which is always a defect in one of them.
    pub fn distances(&self, graph: &Digraph) -> Result<DistanceMap> {
        match self {
            Backend::Sparse(b) => Ok(b.all_pairs_shortest_distances(graph)),
            Backend::Dense(b) => Ok(b.all_pairs_shortest_distances(graph)),
            Backend::Auto(t) => {
                let dense = graph.node_count() <= t.dense_max_nodes
                    && graph.density() >= t.dense_min_density;
                tracing::trace!(
                    nodes = graph.node_count(),
                    density = graph.density(),
                    dense,
                    "auto backend selection"
                );
                if dense {
                    Ok(DenseBackend.all_pairs_shortest_distances(graph))
                } else {
                    Ok(SparseBackend.all_pairs_shortest_distances(graph))
                }
            }
            Backend::Verified => cross_check(&SparseBackend, &DenseBackend, graph),
        }
    }
}

/// Run two strategies on the same graph and require identical output.
pub fn cross_check(
    left: &dyn DistanceBackend,
    right: &dyn DistanceBackend,
    graph: &Digraph,
) -> Result<DistanceMap> {
    let a = left.all_pairs_shortest_distances(graph);
    let b = right.all_pairs_shortest_distances(graph);
    if let Some(((source, target), l, r)) = a.first_difference(&b) {
        let detail = format!("{source}->{target}: {l:?} vs {r:?}");
        tracing::error!(
            left = left.name(),
            right = right.name(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            %detail,
            "distance backends disagree"
        );
        return Err(Error::BackendDisagreement {
            left: left.name(),
            right: right.name(),
            detail,
        });
    }
    Ok(a)
}
