//! Memory Ordering Tests.
//!
//! Verifies store-to-load forwarding, loads that read memory after the
//! store has retired, and recovery from a load that ran ahead of an older
//! store to the same word.

use crate::common::builder::ProgramBuilder;
use crate::common::harness::TestContext;
use ooosim_core::isa::OpKind;

#[test]
fn test_store_writes_memory_at_commit() {
    let program = ProgramBuilder::new()
        .ins(OpKind::Sw, &["x3", "x2", "0"])
        .build();
    let mut ctx = TestContext::new(program);
    ctx.step(5);
    let item = ctx.state().stores.items().next().copied().unwrap();
    assert_eq!(item.address, Some(25));
    assert_eq!(ctx.state().memory_value(25, 4), 0);

    ctx.run_to_end();
    assert_eq!(ctx.state().memory_value(25, 4), 6);
    assert!(ctx.state().stores.is_empty());
    assert_eq!(ctx.sim.stats().memory_writes, 1);
    assert_eq!(ctx.sim.stats().committed_store, 1);
}

#[test]
fn test_load_forwards_from_older_store() {
    let program = ProgramBuilder::new()
        .ins(OpKind::Sw, &["x3", "x2", "0"])
        .ins(OpKind::Lw, &["x5", "x2", "0"])
        .build();
    let mut ctx = TestContext::new(program);
    ctx.run_to_end();
    assert_eq!(ctx.reg("x5"), 6);
    assert_eq!(ctx.state().memory_value(25, 4), 6);
    let stats = ctx.sim.stats();
    assert_eq!(stats.loads_forwarded, 1);
    assert_eq!(stats.memory_reads, 0);
    assert_eq!(stats.memory_hazards, 0);
}

#[test]
fn test_load_after_retired_store_reads_memory() {
    // The load address depends on a multiply chain, so the store has
    // already left the buffer when the load computes its address.
    let program = ProgramBuilder::new()
        .ins(OpKind::Sw, &["x3", "x2", "0"])
        .ins(OpKind::Mul, &["x8", "x3", "x0"])
        .ins(OpKind::Add, &["x9", "x8", "x2"])
        .ins(OpKind::Lw, &["x5", "x9", "0"])
        .build();
    let mut ctx = TestContext::new(program);
    ctx.run_to_end();
    assert_eq!(ctx.reg("x5"), 6);
    let stats = ctx.sim.stats();
    assert_eq!(stats.loads_forwarded, 0);
    assert_eq!(stats.memory_reads, 1);
}

#[test]
fn test_load_from_unwritten_memory_reads_zero() {
    let program = ProgramBuilder::new()
        .ins(OpKind::Sw, &["x3", "x2", "0"])
        .ins(OpKind::Lw, &["x6", "x0", "100"])
        .build();
    let mut ctx = TestContext::new(program);
    ctx.run_to_end();
    assert_eq!(ctx.reg("x6"), 0);
    assert_eq!(ctx.state().memory_value(25, 4), 6);
    assert_eq!(ctx.sim.stats().memory_hazards, 0);
}

#[test]
fn test_load_ahead_of_store_is_replayed() {
    // The store address waits on `add`, so the load reads memory first and
    // must be squashed once the store resolves to the same word.
    let program = ProgramBuilder::new()
        .ins(OpKind::Add, &["x7", "x2", "x0"])
        .ins(OpKind::Sw, &["x3", "x7", "0"])
        .ins(OpKind::Lw, &["x5", "x2", "0"])
        .build();
    let mut ctx = TestContext::new(program);
    ctx.run_to_end();
    assert_eq!(ctx.reg("x5"), 6);
    let stats = ctx.sim.stats();
    assert_eq!(stats.memory_hazards, 1);
    assert!(stats.flushes >= 1);
    assert_eq!(stats.instructions_committed, 3);
}

#[test]
fn test_narrow_accesses_extend_correctly() {
    let program = ProgramBuilder::new()
        .ins(OpKind::Sb, &["x4", "x0", "40"])
        .ins(OpKind::Addi, &["x1", "x0", "1"])
        .ins(OpKind::Mul, &["x1", "x1", "x1"])
        .ins(OpKind::Mul, &["x1", "x1", "x1"])
        .ins(OpKind::Lb, &["x5", "x1", "39"])
        .ins(OpKind::Lbu, &["x6", "x1", "39"])
        .build();
    let mut ctx = TestContext::new(program);
    ctx.run_to_end();
    assert_eq!(ctx.state().memory_value(40, 1), 0xFE);
    assert_eq!(ctx.reg("x5"), -2);
    assert_eq!(ctx.reg("x6"), 0xFE);
}

#[test]
fn test_wide_load_waits_for_store_in_its_upper_word() {
    let program = ProgramBuilder::new()
        .ins(OpKind::Sw, &["x3", "x0", "28"])
        .ins(OpKind::Ld, &["x5", "x0", "24"])
        .build();
    let mut ctx = TestContext::new(program);
    ctx.run_to_end();
    assert_eq!(ctx.reg("x5"), 6 << 32);
    assert_eq!(ctx.state().memory_value(24, 8), 6 << 32);
    assert_eq!(ctx.sim.stats().loads_forwarded, 0);
}

#[test]
fn test_wide_load_ahead_of_store_in_its_upper_word_is_replayed() {
    let program = ProgramBuilder::new()
        .ins(OpKind::Add, &["x7", "x0", "x0"])
        .ins(OpKind::Sw, &["x3", "x7", "28"])
        .ins(OpKind::Ld, &["x5", "x0", "24"])
        .build();
    let mut ctx = TestContext::new(program);
    ctx.run_to_end();
    assert_eq!(ctx.reg("x5"), 6 << 32);
    assert_eq!(ctx.sim.stats().memory_hazards, 1);
    assert_eq!(ctx.sim.stats().instructions_committed, 3);
}

#[test]
fn test_two_stores_to_same_word_leave_the_younger_value() {
    let program = ProgramBuilder::new()
        .ins(OpKind::Sw, &["x3", "x2", "0"])
        .ins(OpKind::Sw, &["x4", "x2", "0"])
        .ins(OpKind::Lw, &["x5", "x2", "0"])
        .build();
    let mut ctx = TestContext::new(program);
    ctx.run_to_end();
    assert_eq!(ctx.reg("x5"), -2);
    assert_eq!(ctx.state().memory_value(25, 4), 0xFFFF_FFFE);
    assert_eq!(ctx.sim.stats().memory_writes, 2);
}

#[test]
fn test_younger_store_resolving_late_still_wins() {
    // The second store's base waits on `add`, so its address is unknown
    // while the first store and the load are already in flight.
    let program = ProgramBuilder::new()
        .ins(OpKind::Add, &["x7", "x2", "x0"])
        .ins(OpKind::Sw, &["x3", "x2", "0"])
        .ins(OpKind::Sw, &["x4", "x7", "0"])
        .ins(OpKind::Lw, &["x5", "x2", "0"])
        .build();
    let mut ctx = TestContext::new(program);
    ctx.run_to_end();
    assert_eq!(ctx.reg("x5"), -2);
    assert_eq!(ctx.state().memory_value(25, 4), 0xFFFF_FFFE);
    assert_eq!(ctx.sim.stats().committed_store, 2);
}
