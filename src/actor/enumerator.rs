//! Actor table enumeration.
//!
//! Scans the host process actor table and produces the current snapshot
//! set. Pure function of process state at call time: nothing is cached
//! between calls, and concurrent enumerations are allowed since each call
//! reads into its own buffers.

use crate::actor::types::ActorSnapshot;
use crate::core::layout::TableLayout;
use crate::core::memory::{self, MemoryReader};
use log::{Level, debug, log_enabled, warn};
use std::sync::Arc;

pub struct ActorEnumerator<M: MemoryReader> {
    reader: Arc<M>,
    layout: TableLayout,
}

impl<M: MemoryReader> ActorEnumerator<M> {
    pub fn new(reader: Arc<M>, layout: TableLayout) -> Self {
        Self { reader, layout }
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    /// Scan the live actor table, in table order. Null slots are skipped;
    /// an entry whose address went invalid mid-scan is dropped instead of
    /// aborting the pass. Table order is incidental; identity is by
    /// `stable_id`, never by position.
    pub fn enumerate(&self) -> Vec<ActorSnapshot> {
        let (base, count) = self.table_source();

        let mut results = Vec::new();
        for i in 0..count {
            let slot_addr = base + i as u64 * self.layout.pointer_stride;
            let ptr = match memory::read_pointer(&*self.reader, slot_addr) {
                Ok(ptr) => ptr,
                Err(e) => {
                    if log_enabled!(Level::Debug) {
                        debug!("Table slot {} unreadable: {}", i, e);
                    }
                    continue;
                },
            };

            // Empty slot, not an error
            if ptr == 0 {
                continue;
            }

            match ActorSnapshot::read(&*self.reader, &self.layout, ptr) {
                Ok(snapshot) => results.push(snapshot),
                Err(e) => {
                    if log_enabled!(Level::Debug) {
                        debug!("Actor at 0x{:X} dropped mid-scan: {}", ptr, e);
                    }
                },
            }
        }

        results
    }

    /// Active table source: the overlay table carries its own length; the
    /// default table has a fixed, build-supplied capacity.
    fn table_source(&self) -> (u64, usize) {
        if self.reader.is_capture_mode_active() {
            let count = match memory::read_value::<i32, M>(&*self.reader, self.layout.overlay_table_address) {
                Ok(count) => count.max(0) as usize,
                Err(e) => {
                    warn!("Overlay table length unreadable: {}", e);
                    0
                },
            };
            (
                self.layout.overlay_table_address + self.layout.overlay_header_size,
                count,
            )
        } else {
            (self.layout.table_address, self.layout.table_capacity)
        }
    }
}
