//! Actor tracking: durable pins over volatile addresses, a single
//! process-wide selection, and the background poll loop.
//!
//! # Architecture
//!
//! - `events`: notification fan-out consumed by presentation layers
//! - `confirm`: external yes/no confirmation capability
//! - `pinned`: the durable slot and its retarget (identity resolution)
//! - `manager`: pin/unpin/select state machine and the tick loop
//!
//! # Usage
//!
//! ```ignore
//! let manager = Arc::new(TrackerManager::new(reader, confirm, TableLayout::default())?);
//! let events = manager.subscribe();
//! manager.start().await?;
//!
//! // later, on the interactive context
//! manager.pin_actor(&snapshot).await;
//! ```

pub mod confirm;
pub mod events;
pub mod manager;
pub mod pinned;

#[cfg(test)]
pub mod tests;

pub use confirm::{AutoDecline, ConfirmAnswer, Confirmation};
pub use events::{EventBus, TrackerEvent};
pub use manager::{CONVERT_EXEMPT_DATA_ID, PinOutcome, TICK_INTERVAL, TrackerManager};
pub use pinned::{PinnedActor, initials_for};
