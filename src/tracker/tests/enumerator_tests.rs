//! Actor table enumeration tests.

use crate::actor::enumerator::ActorEnumerator;
use crate::actor::types::ActorKind;
use crate::tracker::tests::mock_memory::{
    MockMemory, alloc_table, set_table_slot, test_layout, write_actor,
};
use std::sync::Arc;

#[test]
fn null_slots_are_skipped_and_order_is_preserved() {
    let mem = Arc::new(MockMemory::new());
    let layout = test_layout();
    alloc_table(&mem, &layout);

    write_actor(&mem, &layout, 0x10000, 0x11, 0, ActorKind::Player, 0, "Aria");
    write_actor(&mem, &layout, 0x20000, 0x22, 0, ActorKind::BattleNpc, 0, "Behemoth");
    write_actor(&mem, &layout, 0x30000, 0x33, 0, ActorKind::EventNpc, 0, "Cid");

    // Valid entries interleaved with empty slots
    set_table_slot(&mem, &layout, 1, 0x10000);
    set_table_slot(&mem, &layout, 4, 0x20000);
    set_table_slot(&mem, &layout, 9, 0x30000);

    let enumerator = ActorEnumerator::new(mem, layout);
    let actors = enumerator.enumerate();

    let names: Vec<&str> = actors.iter().map(|a| a.display_name.as_str()).collect();
    assert_eq!(names, ["Aria", "Behemoth", "Cid"]);
    assert!(actors.iter().all(|a| a.is_resolvable()));
}

#[test]
fn stale_entry_is_dropped_without_aborting_the_scan() {
    let mem = Arc::new(MockMemory::new());
    let layout = test_layout();
    alloc_table(&mem, &layout);

    write_actor(&mem, &layout, 0x10000, 0x11, 0, ActorKind::Player, 0, "Aria");
    set_table_slot(&mem, &layout, 0, 0x10000);
    // Dangling pointer: no region behind it
    set_table_slot(&mem, &layout, 1, 0xDEAD0000);
    write_actor(&mem, &layout, 0x30000, 0x33, 0, ActorKind::EventNpc, 0, "Cid");
    set_table_slot(&mem, &layout, 2, 0x30000);

    let enumerator = ActorEnumerator::new(mem, layout);
    let actors = enumerator.enumerate();

    let names: Vec<&str> = actors.iter().map(|a| a.display_name.as_str()).collect();
    assert_eq!(names, ["Aria", "Cid"]);
}

#[test]
fn capture_mode_reads_the_overlay_table() {
    let mem = Arc::new(MockMemory::new());
    let layout = test_layout();
    alloc_table(&mem, &layout);

    // Default table holds one actor...
    write_actor(&mem, &layout, 0x10000, 0x11, 0, ActorKind::Player, 0, "Aria");
    set_table_slot(&mem, &layout, 0, 0x10000);

    // ...the overlay table two different ones
    write_actor(&mem, &layout, 0x40000, 0x44, 0, ActorKind::Player, 0, "Dancer");
    write_actor(&mem, &layout, 0x50000, 0x55, 0, ActorKind::Player, 0, "Estinien");
    mem.alloc(layout.overlay_table_address, 0x40);
    mem.write_u32(layout.overlay_table_address, 2);
    mem.write_u64(layout.overlay_table_address + layout.overlay_header_size, 0x40000);
    mem.write_u64(
        layout.overlay_table_address + layout.overlay_header_size + layout.pointer_stride,
        0x50000,
    );

    let enumerator = ActorEnumerator::new(mem.clone(), layout);

    mem.set_capture_mode(true);
    let names: Vec<String> = enumerator
        .enumerate()
        .into_iter()
        .map(|a| a.display_name)
        .collect();
    assert_eq!(names, ["Dancer", "Estinien"]);

    mem.set_capture_mode(false);
    let names: Vec<String> = enumerator
        .enumerate()
        .into_iter()
        .map(|a| a.display_name)
        .collect();
    assert_eq!(names, ["Aria"]);
}

#[test]
fn unreadable_table_slot_is_tolerated() {
    let mem = Arc::new(MockMemory::new());
    let layout = test_layout();
    alloc_table(&mem, &layout);

    write_actor(&mem, &layout, 0x10000, 0x11, 0, ActorKind::Player, 0, "Aria");
    set_table_slot(&mem, &layout, 0, 0x10000);
    write_actor(&mem, &layout, 0x20000, 0x22, 0, ActorKind::Player, 0, "Bria");
    set_table_slot(&mem, &layout, 2, 0x20000);

    // Slot 1 itself cannot be read
    mem.set_faulty(layout.table_address + layout.pointer_stride, 8);

    let enumerator = ActorEnumerator::new(mem, layout);
    let names: Vec<String> = enumerator
        .enumerate()
        .into_iter()
        .map(|a| a.display_name)
        .collect();
    assert_eq!(names, ["Aria", "Bria"]);
}
