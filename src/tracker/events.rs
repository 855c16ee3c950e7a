//! Tracker notification fan-out.
//!
//! An explicit channel abstraction instead of property-changed observer
//! chains: subscribers own their receiver, the tracker owns the sender
//! side. Events are delivered in the order the triggering operations were
//! issued.

use crate::actor::types::ActorSnapshot;
use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackerEvent {
    /// The process-wide selection changed; `None` means cleared.
    SelectionChanged(Option<ActorSnapshot>),
    /// A slot was appended to the pin list.
    ActorPinned { stable_id: String, display_name: String },
    /// A slot was removed from the pin list.
    ActorUnpinned { stable_id: String },
    /// A pinned slot stopped resolving (valid -> lost).
    ActorLost { stable_id: String, initials: String },
    /// A lost slot resolved again (lost -> valid).
    ActorFound { stable_id: String, initials: String },
}

/// Multi-subscriber event fan-out. Disconnected subscribers are pruned on
/// the next emit.
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<TrackerEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> Receiver<TrackerEvent> {
        let (tx, rx) = unbounded();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    pub fn emit(&self, event: TrackerEvent) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
