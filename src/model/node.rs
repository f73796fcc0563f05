//! Sentence node identifier.

use serde::{Deserialize, Serialize};

/// Opaque sentence identifier.
///
/// The engine attaches no attributes to a sentence beyond its identity;
/// text, language and ownership live in the caller's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentenceId(pub u64);

impl std::fmt::Display for SentenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SentenceId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}
