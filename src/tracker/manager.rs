//! Tracker orchestration: the pin set, the process-wide selection, and the
//! background poll loop.
//!
//! `TrackerManager` is the only component with process-wide lifetime and
//! mutable shared state. Construct one instance per process at host
//! startup, share it behind `Arc`, and keep every collection mutation going
//! through its methods; the poll loop itself never mutates the pin list or
//! the selection, it only refreshes values on the already-resolved
//! selection.

use crate::actor::enumerator::ActorEnumerator;
use crate::actor::types::{ActorKind, ActorSnapshot, COMPANION_PLAYER_MODELS};
use crate::core::globals::TOKIO_RUNTIME;
use crate::core::layout::TableLayout;
use crate::core::memory::MemoryReader;
use crate::tracker::confirm::{ConfirmAnswer, Confirmation};
use crate::tracker::events::{EventBus, TrackerEvent};
use crate::tracker::pinned::PinnedActor;
use anyhow::{Result, anyhow};
use crossbeam_channel::Receiver;
use log::{Level, debug, error, log_enabled};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Poll cadence for refreshing the selected actor's live values.
pub const TICK_INTERVAL: Duration = Duration::from_millis(33);

/// Event NPC exempt from the convert-to-player prompt (squadron members
/// and lawn retainers keep their raw kind).
pub const CONVERT_EXEMPT_DATA_ID: u32 = 1011832;

const CONVERT_TITLE: &str = "Convert to player";

/// Outcome of a pin request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOutcome {
    Pinned,
    /// The entity already resolves to an existing pinned slot; silent no-op.
    AlreadyPinned,
}

/// Pin list and selection, shared between the manager and the poll loop.
/// The loop only ever reads it.
struct TrackState {
    /// Pin order is insertion order; no reordering operation exists.
    pinned: RwLock<Vec<Arc<PinnedActor>>>,
    selected_id: RwLock<Option<String>>,
}

impl TrackState {
    fn selected_id(&self) -> Option<String> {
        self.selected_id.read().ok().and_then(|id| id.clone())
    }

    fn find_slot(&self, stable_id: &str) -> Option<Arc<PinnedActor>> {
        self.pinned.read().ok().and_then(|pinned| {
            pinned
                .iter()
                .find(|slot| slot.stable_id() == stable_id)
                .cloned()
        })
    }

    fn first_pinned_id(&self) -> Option<String> {
        self.pinned
            .read()
            .ok()
            .and_then(|pinned| pinned.first().map(|slot| slot.stable_id().to_string()))
    }

    fn selected_slot(&self) -> Option<Arc<PinnedActor>> {
        let id = self.selected_id()?;
        self.find_slot(&id)
    }
}

pub struct TrackerManager<M: MemoryReader, C: Confirmation> {
    reader: Arc<M>,
    confirm: Arc<C>,
    enumerator: ActorEnumerator<M>,
    layout: TableLayout,
    events: EventBus,
    state: Arc<TrackState>,
    cancel_token: CancellationToken,
    tick_handle: Mutex<Option<JoinHandle<()>>>,
}

impl<M, C> TrackerManager<M, C>
where
    M: MemoryReader + 'static,
    C: Confirmation + 'static,
{
    pub fn new(reader: Arc<M>, confirm: Arc<C>, layout: TableLayout) -> Result<Self> {
        layout.validate()?;
        Ok(Self {
            enumerator: ActorEnumerator::new(reader.clone(), layout.clone()),
            reader,
            confirm,
            layout,
            events: EventBus::new(),
            state: Arc::new(TrackState {
                pinned: RwLock::new(Vec::new()),
                selected_id: RwLock::new(None),
            }),
            cancel_token: CancellationToken::new(),
            tick_handle: Mutex::new(None),
        })
    }

    /// Receive tracker notifications. Events arrive in the order the
    /// triggering operations were issued.
    pub fn subscribe(&self) -> Receiver<TrackerEvent> {
        self.events.subscribe()
    }

    /// Enumerate once so the surface is never empty on launch, then start
    /// the poll loop. Returns an error if already started.
    pub async fn start(&self) -> Result<()> {
        if self.is_running() {
            return Err(anyhow!("Tracker already started"));
        }

        let all_actors = self.enumerator.enumerate();
        if let Some(first) = all_actors.first() {
            self.pin_actor(first).await;
        }

        let handle = TOKIO_RUNTIME.spawn(Self::run_tick_loop(
            self.reader.clone(),
            self.layout.clone(),
            self.state.clone(),
            self.cancel_token.clone(),
        ));
        if let Ok(mut tick_handle) = self.tick_handle.lock() {
            *tick_handle = Some(handle);
        }
        Ok(())
    }

    /// Stop the poll loop. Idempotent; the loop observes the token on its
    /// next iteration.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_running(&self) -> bool {
        if let Ok(tick_handle) = self.tick_handle.lock() {
            if let Some(ref handle) = *tick_handle {
                return !handle.is_finished();
            }
        }
        false
    }

    /// Pin an actor. No-op when it already resolves to an existing pinned
    /// slot. Conversion prompts fire before the slot is created; either,
    /// both, or neither may fire, and a "no" still pins the unconverted
    /// entity.
    pub async fn pin_actor(&self, snapshot: &ActorSnapshot) -> PinOutcome {
        if self.resolves_to_pinned(snapshot) {
            return PinOutcome::AlreadyPinned;
        }

        let mut kind_override = None;

        // Mannequins and housing NPCs get their kind changed on request;
        // squadron members and lawn retainers do not.
        if snapshot.kind == ActorKind::EventNpc && snapshot.data_id != CONVERT_EXEMPT_DATA_ID {
            let answer = self
                .confirm
                .ask(
                    &format!("Convert {} to a player?", snapshot.display_name),
                    CONVERT_TITLE,
                )
                .await;
            if answer == ConfirmAnswer::Yes {
                kind_override = Some(ActorKind::Player);
            }
        }

        // Companions carry a player model under a battle-NPC kind
        if snapshot.kind == ActorKind::BattleNpc
            && COMPANION_PLAYER_MODELS.contains(&snapshot.model_variant)
        {
            let answer = self
                .confirm
                .ask(
                    &format!("Treat {} as a player?", snapshot.display_name),
                    CONVERT_TITLE,
                )
                .await;
            if answer == ConfirmAnswer::Yes {
                kind_override = Some(ActorKind::Player);
            }
        }

        // The prompts awaited user input; a concurrent pin may have landed
        // in the meantime. Best-effort dedup, re-checked before append.
        if self.resolves_to_pinned(snapshot) {
            return PinOutcome::AlreadyPinned;
        }

        let slot = Arc::new(PinnedActor::new(snapshot, kind_override));
        let stable_id = slot.stable_id().to_string();
        let display_name = slot.display_name();

        if let Ok(mut pinned) = self.state.pinned.write() {
            pinned.push(slot);
        }

        self.select_slot(&stable_id);
        self.events.emit(TrackerEvent::ActorPinned {
            stable_id,
            display_name,
        });
        PinOutcome::Pinned
    }

    /// Remove a pin. When the removed slot was selected, selection falls to
    /// the first remaining pin, or clears if none remain.
    pub fn unpin_actor(&self, stable_id: &str) {
        let removed = if let Ok(mut pinned) = self.state.pinned.write() {
            let before = pinned.len();
            pinned.retain(|slot| slot.stable_id() != stable_id);
            before != pinned.len()
        } else {
            false
        };
        if !removed {
            return;
        }

        self.events.emit(TrackerEvent::ActorUnpinned {
            stable_id: stable_id.to_string(),
        });

        if self.state.selected_id().as_deref() == Some(stable_id) {
            match self.state.first_pinned_id() {
                Some(next) => self.select_slot(&next),
                None => self.publish_selection(None, None),
            }
        }
    }

    /// Whether some pinned slot tracks this snapshot's identity.
    pub fn is_pinned(&self, snapshot: &ActorSnapshot) -> bool {
        self.state
            .pinned
            .read()
            .map(|pinned| {
                pinned
                    .iter()
                    .any(|slot| slot.stable_id() == snapshot.stable_id)
            })
            .unwrap_or(false)
    }

    /// Select a pinned slot as the process-wide selection. The slot is
    /// resolved to its live entity first; an unknown id clears selection.
    pub fn select_slot(&self, stable_id: &str) {
        match self.state.find_slot(stable_id) {
            Some(slot) => {
                slot.retarget(&self.enumerator, &self.events);
                let snapshot = slot.current_snapshot();
                self.publish_selection(Some(slot.stable_id().to_string()), snapshot);
            },
            None => self.publish_selection(None, None),
        }
    }

    /// Clear the selection. No-op when nothing is selected.
    pub fn clear_selection(&self) {
        if self.state.selected_id().is_none() {
            return;
        }
        self.publish_selection(None, None);
    }

    /// Remove every pin and clear the selection. No-op when nothing is
    /// pinned.
    pub fn clear_all_pins(&self) {
        let removed: Vec<Arc<PinnedActor>> = match self.state.pinned.write() {
            Ok(mut pinned) if !pinned.is_empty() => pinned.drain(..).collect(),
            _ => return,
        };

        for slot in &removed {
            self.events.emit(TrackerEvent::ActorUnpinned {
                stable_id: slot.stable_id().to_string(),
            });
        }
        if self.state.selected_id().is_some() {
            self.publish_selection(None, None);
        }
    }

    /// If nothing is selected but pins exist, select the first pin. Used
    /// after actions that may implicitly have dropped the selection.
    pub fn ensure_selection(&self) {
        if self.state.selected_id().is_some() {
            return;
        }
        if let Some(first) = self.state.first_pinned_id() {
            self.select_slot(&first);
        }
    }

    /// Re-derive the selection from the first pin after the underlying
    /// reference set was invalidated wholesale (a host save/load boundary).
    pub fn retarget_selection(&self) {
        if let Ok(mut selected) = self.state.selected_id.write() {
            *selected = None;
        }
        if let Some(first) = self.state.first_pinned_id() {
            self.select_slot(&first);
        }
    }

    pub fn selected_id(&self) -> Option<String> {
        self.state.selected_id()
    }

    /// Live snapshot of the selected slot, if it currently resolves.
    pub fn selected_actor(&self) -> Option<ActorSnapshot> {
        self.state.selected_slot()?.current_snapshot()
    }

    /// Pinned slots in insertion order.
    pub fn pinned_actors(&self) -> Vec<Arc<PinnedActor>> {
        self.state
            .pinned
            .read()
            .map(|pinned| pinned.clone())
            .unwrap_or_default()
    }

    /// Dedup guard for pin requests: matches by tracked identity or by the
    /// currently resolved address.
    fn resolves_to_pinned(&self, snapshot: &ActorSnapshot) -> bool {
        let Ok(pinned) = self.state.pinned.read() else {
            return false;
        };
        pinned.iter().any(|slot| {
            slot.stable_id() == snapshot.stable_id
                || (snapshot.address.is_some() && slot.current_address() == snapshot.address)
        })
    }

    /// Publish a new selection: store it, let every slot recompute its own
    /// selected flag, then notify subscribers.
    fn publish_selection(&self, stable_id: Option<String>, snapshot: Option<ActorSnapshot>) {
        if let Ok(mut selected) = self.state.selected_id.write() {
            *selected = stable_id.clone();
        }
        if let Ok(pinned) = self.state.pinned.read() {
            for slot in pinned.iter() {
                slot.set_selected(Some(slot.stable_id()) == stable_id.as_deref());
            }
        }
        self.events.emit(TrackerEvent::SelectionChanged(snapshot));
    }

    /// The poll loop. Refreshes the selected slot's live values at a fixed
    /// cadence until cancelled; a failing read is logged and the loop
    /// carries on with the next tick. Never mutates the pin list or the
    /// selection.
    async fn run_tick_loop(
        reader: Arc<M>,
        layout: TableLayout,
        state: Arc<TrackState>,
        cancel_token: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                _ = ticker.tick() => {},
            }

            let Some(slot) = state.selected_slot() else {
                continue;
            };
            if let Err(e) = slot.refresh_values(&*reader, &layout) {
                error!("Failed to tick selected actor: {}", e);
            }
        }

        if log_enabled!(Level::Debug) {
            debug!("Tracker tick loop stopped");
        }
    }
}
