//! In-memory layout of the host process actor table.
//!
//! Every address and offset here is engine-build specific and supplied by
//! the host integration; the defaults match the build this crate was
//! developed against. Nothing in this module is derived at runtime.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Fixed upper bound of the default actor table. Known layout constant of
/// the host build, not algorithmically derived; validate against the host
/// before trusting a hand-edited config.
pub const DEFAULT_TABLE_CAPACITY: usize = 424;

/// Table entries are raw 8-byte pointers in both table layouts.
pub const POINTER_STRIDE: u64 = 8;

/// The overlay table begins with a 64-bit header holding the entry count;
/// entries start right after it.
pub const OVERLAY_TABLE_HEADER_SIZE: u64 = 8;

/// Field offsets inside one actor object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorFieldLayout {
    /// 32-bit object id, the identity key of a live entity.
    pub object_id: u64,
    /// 32-bit sheet/data id, used for conversion exemptions.
    pub data_id: u64,
    /// Single-byte object kind.
    pub object_kind: u64,
    /// 32-bit model variant.
    pub model_variant: u64,
    /// NUL-terminated UTF-8 name field.
    pub name: u64,
    /// Capacity of the name field in bytes.
    pub name_len: usize,
}

impl Default for ActorFieldLayout {
    fn default() -> Self {
        Self {
            object_id: 0x74,
            data_id: 0x78,
            object_kind: 0x8C,
            model_variant: 0x01B4,
            name: 0x30,
            name_len: 64,
        }
    }
}

/// Actor table placement and shape for one host build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableLayout {
    /// Default actor table address.
    pub table_address: u64,
    /// Overlay-mode actor table address (count header + entries).
    pub overlay_table_address: u64,
    /// Slot count of the default table.
    pub table_capacity: usize,
    /// Byte stride between table slots.
    pub pointer_stride: u64,
    /// Bytes before the first overlay table entry.
    pub overlay_header_size: u64,
    pub fields: ActorFieldLayout,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            table_address: 0x01C9_3AB0,
            overlay_table_address: 0x01C9_5E40,
            table_capacity: DEFAULT_TABLE_CAPACITY,
            pointer_stride: POINTER_STRIDE,
            overlay_header_size: OVERLAY_TABLE_HEADER_SIZE,
            fields: ActorFieldLayout::default(),
        }
    }
}

impl TableLayout {
    /// Reject configs that cannot describe a scannable table.
    pub fn validate(&self) -> Result<()> {
        if self.table_capacity == 0 {
            return Err(anyhow!("Table capacity must be non-zero"));
        }
        if self.pointer_stride == 0 {
            return Err(anyhow!("Pointer stride must be non-zero"));
        }
        if self.fields.name_len == 0 {
            return Err(anyhow!("Name field length must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_layout_is_valid() {
        assert!(TableLayout::default().validate().is_ok());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let layout = TableLayout {
            table_capacity: 0,
            ..TableLayout::default()
        };
        assert!(layout.validate().is_err());
    }
}
