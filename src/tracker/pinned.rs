//! Pinned slots: durable logical handles over volatile actor addresses.
//!
//! A slot never keeps a long-lived reference into foreign memory. Its only
//! durable datum is the stable id copied at pin time; the physical
//! association is re-derived from a fresh enumeration on every retarget.

use crate::actor::enumerator::ActorEnumerator;
use crate::actor::types::{ActorKind, ActorSnapshot, COMPANION_PLAYER_MODELS};
use crate::core::layout::TableLayout;
use crate::core::memory::MemoryReader;
use crate::tracker::events::{EventBus, TrackerEvent};
use anyhow::Result;
use itertools::Itertools;
use log::{info, warn};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Presentation and resolution state cached per slot, refreshed on each
/// successful retarget. Read by the notification layer, hence the lock.
#[derive(Debug)]
struct PinState {
    current: Option<ActorSnapshot>,
    display_name: String,
    kind: ActorKind,
    model_variant: i32,
    initials: String,
    is_valid: bool,
}

/// A user-durable reference to one logical actor.
///
/// The stable id is copied at creation and immutable for the slot's life.
/// When the entity vanishes the slot goes "lost" but keeps its last-known
/// name and initials, so the pin stays visible and can self-heal when the
/// entity reappears under the same identity.
pub struct PinnedActor {
    stable_id: String,
    /// User-accepted conversion at pin time. Survives retargets, which
    /// keep re-reading the raw kind from memory.
    kind_override: Option<ActorKind>,
    state: Mutex<PinState>,
    selected: AtomicBool,
}

impl PinnedActor {
    /// Seed a slot from a snapshot. Presentation fields start from the
    /// snapshot and settle on the first retarget.
    pub fn new(snapshot: &ActorSnapshot, kind_override: Option<ActorKind>) -> Self {
        Self {
            stable_id: snapshot.stable_id.clone(),
            kind_override,
            state: Mutex::new(PinState {
                current: None,
                display_name: snapshot.display_name.clone(),
                kind: snapshot.kind,
                model_variant: snapshot.model_variant,
                initials: initials_for(&snapshot.display_name),
                is_valid: false,
            }),
            selected: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn stable_id(&self) -> &str {
        &self.stable_id
    }

    pub fn is_valid(&self) -> bool {
        self.state.lock().map(|state| state.is_valid).unwrap_or(false)
    }

    pub fn display_name(&self) -> String {
        self.state
            .lock()
            .map(|state| state.display_name.clone())
            .unwrap_or_default()
    }

    pub fn initials(&self) -> String {
        self.state
            .lock()
            .map(|state| state.initials.clone())
            .unwrap_or_default()
    }

    pub fn kind(&self) -> ActorKind {
        self.state.lock().map(|state| state.kind).unwrap_or(ActorKind::None)
    }

    pub fn model_variant(&self) -> i32 {
        self.state.lock().map(|state| state.model_variant).unwrap_or(0)
    }

    /// Kind as surfaced downstream: a pin-time conversion wins, then the
    /// companion-model reclassification, then the raw kind.
    pub fn effective_kind(&self) -> ActorKind {
        if let Some(kind) = self.kind_override {
            return kind;
        }
        let Ok(state) = self.state.lock() else {
            return ActorKind::None;
        };
        if state.kind == ActorKind::BattleNpc && COMPANION_PLAYER_MODELS.contains(&state.model_variant)
        {
            ActorKind::Player
        } else {
            state.kind
        }
    }

    pub fn current_address(&self) -> Option<u64> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.current.as_ref().and_then(|snap| snap.address))
    }

    pub fn current_snapshot(&self) -> Option<ActorSnapshot> {
        self.state.lock().ok().and_then(|state| state.current.clone())
    }

    #[inline]
    pub fn is_selected(&self) -> bool {
        self.selected.load(Ordering::Relaxed)
    }

    /// Recompute the selection flag; called by the tracker's selection
    /// fan-out for every slot.
    pub(crate) fn set_selected(&self, selected: bool) {
        self.selected.store(selected, Ordering::Relaxed);
    }

    /// Re-resolve this pin against the live actor table. Idempotent, safe
    /// to call repeatedly; never runs concurrently with itself on one slot.
    ///
    /// Returns whether the slot resolves after the pass. Lost/found
    /// transitions are published on `events`.
    pub fn retarget<M: MemoryReader>(
        &self,
        enumerator: &ActorEnumerator<M>,
        events: &EventBus,
    ) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        let was_valid = state.is_valid;

        let found = enumerator
            .enumerate()
            .into_iter()
            .find(|snapshot| snapshot.stable_id == self.stable_id && snapshot.is_resolvable());

        match found {
            Some(snapshot) => {
                state.display_name = snapshot.display_name.clone();
                state.kind = snapshot.kind;
                state.model_variant = snapshot.model_variant;
                state.initials = initials_for(&state.display_name);
                state.current = Some(snapshot);
                state.is_valid = true;

                info!("Retargeted actor: {}", state.initials);
                if !was_valid {
                    events.emit(TrackerEvent::ActorFound {
                        stable_id: self.stable_id.clone(),
                        initials: state.initials.clone(),
                    });
                }
                true
            },
            None => {
                // Keep last-known name and initials so the pin stays
                // visible in its lost state
                state.current = None;
                state.is_valid = false;

                if was_valid {
                    warn!("Lost actor: {}", state.initials);
                    events.emit(TrackerEvent::ActorLost {
                        stable_id: self.stable_id.clone(),
                        initials: state.initials.clone(),
                    });
                }
                false
            },
        }
    }

    /// Re-read live field values at the already-resolved address. This is
    /// the tick path: no table scan, no address re-resolution. A read
    /// failure is reported to the caller and leaves the resolution state
    /// untouched; going lost is retarget's call, not the tick's.
    pub fn refresh_values<M>(&self, reader: &M, layout: &TableLayout) -> Result<()>
    where
        M: MemoryReader + ?Sized,
    {
        let Ok(mut state) = self.state.lock() else {
            return Ok(());
        };
        let Some(mut snapshot) = state.current.take() else {
            return Ok(());
        };

        match snapshot.refresh(reader, layout) {
            Ok(()) => {
                if snapshot.display_name != state.display_name {
                    state.display_name = snapshot.display_name.clone();
                    state.initials = initials_for(&state.display_name);
                }
                state.kind = snapshot.kind;
                state.model_variant = snapshot.model_variant;
                state.current = Some(snapshot);
                Ok(())
            },
            Err(e) => {
                state.current = Some(snapshot);
                Err(e)
            },
        }
    }
}

/// Short label derived from a display name. Names of up to four characters
/// pass through verbatim; longer names shrink to the first character of
/// each whitespace-separated token joined with dots.
pub fn initials_for(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "?".to_string();
    }
    if trimmed.chars().count() <= 4 {
        return trimmed.to_string();
    }

    let initials = trimmed
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .join(".");

    if initials.is_empty() {
        match trimmed.chars().next() {
            Some(first) => format!("{}?", first),
            None => "?".to_string(),
        }
    } else {
        initials
    }
}
