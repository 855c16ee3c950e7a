//! Actor tracking core.
//!
//! Tracks in-game entities living in the memory of an external host
//! process and maintains a small stable set of user-pinned references to
//! them, even though the underlying addresses are volatile and may change
//! or vanish between polls. Logical identity is kept by stable id, never
//! by address: pins self-heal across entity relocation, disappearance and
//! reappearance, and a single process-wide selection is exposed to
//! presentation layers through an event channel.
//!
//! # Architecture
//!
//! - `core`: memory access capability, host table layout, shared runtime
//! - `actor`: ephemeral snapshots and the actor-table enumeration
//! - `tracker`: pinned slots, the pin/select state machine, the poll loop
//!
//! Raw memory primitives and dialog flows stay outside the crate, behind
//! the `MemoryReader` and `Confirmation` traits.

pub mod actor;
pub mod core;
pub mod tracker;

pub use crate::actor::{ActorEnumerator, ActorKind, ActorSnapshot};
pub use crate::core::layout::TableLayout;
pub use crate::core::memory::MemoryReader;
pub use crate::tracker::{
    ConfirmAnswer, Confirmation, PinOutcome, PinnedActor, TrackerEvent, TrackerManager,
};
