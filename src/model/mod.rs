//! # Link Model
//!
//! Plain data shared by every layer: sentence ids, persisted link rows,
//! requested edge mutations, distance snapshots and changesets.
//!
//! Design rule: this module is pure data — no I/O, no state, no logging.

pub mod node;
pub mod link;
pub mod distance;
pub mod changeset;

pub use node::SentenceId;
pub use link::{Link, LinkId, NewLink, Edge, DIRECT_LEVEL};
pub use distance::{DistanceMap, DistanceTuple, Pair};
pub use changeset::Changeset;
