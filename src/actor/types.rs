use crate::core::layout::TableLayout;
use crate::core::memory::{self, MemoryReader};
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Object ids at or above this value mark entities without a persistent id.
pub const INVALID_OBJECT_ID: u32 = 0xE000_0000;

/// Model variants that carry a player model under a battle-NPC kind
/// (summoned companions). Surfaced as players for pinning purposes.
pub const COMPANION_PLAYER_MODELS: [i32; 4] = [1, 409, 410, 412];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    None,
    Player,
    BattleNpc,
    EventNpc,
    Treasure,
    Aetheryte,
    GatheringPoint,
    Mount,
    Companion,
    Retainer,
    Housing,
}

impl ActorKind {
    #[inline]
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::None),
            1 => Some(Self::Player),
            2 => Some(Self::BattleNpc),
            3 => Some(Self::EventNpc),
            4 => Some(Self::Treasure),
            5 => Some(Self::Aetheryte),
            6 => Some(Self::GatheringPoint),
            8 => Some(Self::Mount),
            9 => Some(Self::Companion),
            10 => Some(Self::Retainer),
            12 => Some(Self::Housing),
            _ => None,
        }
    }

    #[inline]
    pub fn to_id(&self) -> u8 {
        match self {
            ActorKind::None => 0,
            ActorKind::Player => 1,
            ActorKind::BattleNpc => 2,
            ActorKind::EventNpc => 3,
            ActorKind::Treasure => 4,
            ActorKind::Aetheryte => 5,
            ActorKind::GatheringPoint => 6,
            ActorKind::Mount => 8,
            ActorKind::Companion => 9,
            ActorKind::Retainer => 10,
            ActorKind::Housing => 12,
        }
    }
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorKind::None => write!(f, "None"),
            ActorKind::Player => write!(f, "Player"),
            ActorKind::BattleNpc => write!(f, "BattleNpc"),
            ActorKind::EventNpc => write!(f, "EventNpc"),
            ActorKind::Treasure => write!(f, "Treasure"),
            ActorKind::Aetheryte => write!(f, "Aetheryte"),
            ActorKind::GatheringPoint => write!(f, "GatheringPoint"),
            ActorKind::Mount => write!(f, "Mount"),
            ActorKind::Companion => write!(f, "Companion"),
            ActorKind::Retainer => write!(f, "Retainer"),
            ActorKind::Housing => write!(f, "Housing"),
        }
    }
}

/// Lightweight view over one actor at one physical address.
///
/// A snapshot with a non-null address is valid only for the enumeration
/// pass that produced it; never retain it across a poll without
/// re-validation. Logical identity lives in `stable_id`, never in the
/// address or the table position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub stable_id: String,
    pub address: Option<u64>,
    pub kind: ActorKind,
    pub model_variant: i32,
    pub data_id: u32,
    pub display_name: String,
}

impl ActorSnapshot {
    /// Build a snapshot by reading identity fields at `addr`.
    pub fn read<M>(reader: &M, layout: &TableLayout, addr: u64) -> Result<Self>
    where
        M: MemoryReader + ?Sized,
    {
        let fields = &layout.fields;
        let object_id: u32 = memory::read_value(reader, addr + fields.object_id)?;
        let data_id: u32 = memory::read_value(reader, addr + fields.data_id)?;
        let kind_raw: u8 = memory::read_value(reader, addr + fields.object_kind)?;
        let model_variant: i32 = memory::read_value(reader, addr + fields.model_variant)?;
        let display_name = memory::read_cstring(reader, addr + fields.name, fields.name_len)?;

        Ok(Self {
            stable_id: Self::stable_id_for(object_id, &display_name),
            address: Some(addr),
            kind: ActorKind::from_id(kind_raw).unwrap_or(ActorKind::None),
            model_variant,
            data_id,
            display_name,
        })
    }

    /// Identity key assumed constant for one logical entity across
    /// relocations. Entities without a persistent object id fall back to
    /// name identity.
    pub fn stable_id_for(object_id: u32, name: &str) -> String {
        if object_id == 0 || object_id >= INVALID_OBJECT_ID {
            format!("N:{}", name)
        } else {
            format!("{:08X}", object_id)
        }
    }

    /// Re-read live field values at the already-resolved address. This is
    /// the tick path; it never re-resolves the address (see retarget).
    pub fn refresh<M>(&mut self, reader: &M, layout: &TableLayout) -> Result<()>
    where
        M: MemoryReader + ?Sized,
    {
        let addr = self
            .address
            .ok_or_else(|| anyhow!("Refresh on unresolved actor {}", self.stable_id))?;

        let fields = &layout.fields;
        let kind_raw: u8 = memory::read_value(reader, addr + fields.object_kind)?;
        self.model_variant = memory::read_value(reader, addr + fields.model_variant)?;
        self.display_name = memory::read_cstring(reader, addr + fields.name, fields.name_len)?;
        self.kind = ActorKind::from_id(kind_raw).unwrap_or(ActorKind::None);
        Ok(())
    }

    #[inline]
    pub fn is_resolvable(&self) -> bool {
        self.address.is_some()
    }

    /// Kind as surfaced downstream. Companion models read as players even
    /// though the raw kind says battle NPC; this never affects `stable_id`
    /// matching.
    pub fn effective_kind(&self) -> ActorKind {
        if self.kind == ActorKind::BattleNpc && COMPANION_PLAYER_MODELS.contains(&self.model_variant)
        {
            ActorKind::Player
        } else {
            self.kind
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kind_ids_round_trip() {
        for kind in [
            ActorKind::None,
            ActorKind::Player,
            ActorKind::BattleNpc,
            ActorKind::EventNpc,
            ActorKind::Treasure,
            ActorKind::Aetheryte,
            ActorKind::GatheringPoint,
            ActorKind::Mount,
            ActorKind::Companion,
            ActorKind::Retainer,
            ActorKind::Housing,
        ] {
            assert_eq!(ActorKind::from_id(kind.to_id()), Some(kind));
        }
        assert_eq!(ActorKind::from_id(7), None);
    }

    #[test]
    fn stable_id_prefers_object_id() {
        assert_eq!(ActorSnapshot::stable_id_for(0x1234, "Jane Doe"), "00001234");
        assert_eq!(ActorSnapshot::stable_id_for(0, "Jane Doe"), "N:Jane Doe");
        assert_eq!(
            ActorSnapshot::stable_id_for(INVALID_OBJECT_ID, "Jane Doe"),
            "N:Jane Doe"
        );
    }

    #[test]
    fn companion_models_surface_as_player() {
        let mut snap = ActorSnapshot {
            stable_id: "00000001".to_string(),
            address: Some(0x1000),
            kind: ActorKind::BattleNpc,
            model_variant: 409,
            data_id: 0,
            display_name: "Carbuncle".to_string(),
        };
        assert_eq!(snap.effective_kind(), ActorKind::Player);

        snap.model_variant = 2;
        assert_eq!(snap.effective_kind(), ActorKind::BattleNpc);

        snap.kind = ActorKind::EventNpc;
        snap.model_variant = 409;
        assert_eq!(snap.effective_kind(), ActorKind::EventNpc);
    }
}
