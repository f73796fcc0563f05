//! Engine configuration.
//!
//! Chosen once when a [`Recomputer`](crate::engine::Recomputer) or
//! [`Corpus`](crate::Corpus) is constructed. Deserializes from JSON with
//! every field optional:
//!
//! ```json
//! { "backend": "auto", "hops": 2, "max_subgraph_nodes": 5000 }
//! ```

use serde::{Deserialize, Serialize};

use crate::backend::{AutoThresholds, Backend, BackendKind};
use crate::{Error, Result};

/// Tunables for subgraph selection and distance computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Shortest-path strategy.
    pub backend: BackendKind,
    /// Thresholds for `BackendKind::Auto`.
    pub auto: AutoThresholds,
    /// Neighborhood radius for a single edit.
    pub hops: usize,
    /// Upper bound on the widened radius used for batched edits.
    pub max_batch_hops: usize,
    /// Refuse neighborhoods with more sentences than this.
    pub max_subgraph_nodes: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            auto: AutoThresholds::default(),
            hops: 2,
            max_batch_hops: 8,
            max_subgraph_nodes: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_max_subgraph_nodes(mut self, limit: usize) -> Self {
        self.max_subgraph_nodes = Some(limit);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.hops == 0 {
            return Err(Error::Config("hops must be at least 1".into()));
        }
        if self.max_batch_hops < self.hops {
            return Err(Error::Config(format!(
                "max_batch_hops ({}) is below hops ({})",
                self.max_batch_hops, self.hops,
            )));
        }
        if !(0.0..=1.0).contains(&self.auto.dense_min_density) {
            return Err(Error::Config("auto.dense_min_density must be within 0..=1".into()));
        }
        Ok(())
    }

    /// Resolve the configured backend.
    pub fn backend(&self) -> Backend {
        Backend::from_kind(self.backend, self.auto)
    }
}
