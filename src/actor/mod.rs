//! Actors as seen in host process memory: ephemeral snapshots plus the
//! table scan that discovers them.

pub mod enumerator;
pub mod types;

pub use enumerator::ActorEnumerator;
pub use types::{ActorKind, ActorSnapshot, COMPANION_PLAYER_MODELS, INVALID_OBJECT_ID};
