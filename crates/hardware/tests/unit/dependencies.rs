//! Dependency Tests.
//!
//! Read-after-write chains through renamed registers, and the reference
//! counts that keep a committed tag alive while younger readers still
//! need it.

use crate::common::builder::ProgramBuilder;
use crate::common::harness::TestContext;
use ooosim_core::core::arch::Readiness;
use ooosim_core::isa::OpKind;
use pretty_assertions::assert_eq;

fn raw_program() -> ooosim_core::Program {
    ProgramBuilder::new()
        .ins(OpKind::Add, &["x1", "x2", "x3"])
        .ins(OpKind::Add, &["x4", "x1", "x2"])
        .build()
}

#[test]
fn test_reader_is_renamed_to_producer_tag() {
    let mut ctx = TestContext::new(raw_program());
    ctx.step(2);
    assert_eq!(
        ctx.state().renamed_latch_code(),
        vec!["add t0 x2 x3", "add t1 t0 x2"]
    );
    let t0 = ctx.state().register("t0").unwrap();
    assert_eq!(t0.references, 2);
}

#[test]
fn test_committed_tag_stays_assigned_until_reader_commits() {
    let mut ctx = TestContext::new(raw_program());
    ctx.step(7);
    assert_eq!(ctx.reg("x1"), 31);
    assert_eq!(ctx.readiness("t0"), Readiness::Assigned);
    assert_eq!(ctx.state().register("t0").unwrap().references, 1);

    ctx.step(2);
    assert_eq!(ctx.reg("x4"), 56);
    assert_eq!(ctx.readiness("t0"), Readiness::Free);
    assert_eq!(ctx.readiness("t1"), Readiness::Free);
    assert!(ctx.sim.is_finished());
}

#[test]
fn test_dependent_waits_for_broadcast() {
    let mut ctx = TestContext::new(raw_program());
    ctx.step(5);
    assert_eq!(ctx.state().unit_code("FX1").as_deref(), Some("add t0 x2 x3"));
    assert_eq!(
        ctx.state()
            .window_code(ooosim_core::config::UnitClass::Integer),
        vec!["add t1 t0 x2"]
    );
    ctx.step(1);
    assert_eq!(ctx.state().unit_code("FX1").as_deref(), Some("add t1 t0 x2"));
}

#[test]
fn test_write_after_write_keeps_youngest_value() {
    let program = ProgramBuilder::new()
        .ins(OpKind::Addi, &["x1", "x0", "1"])
        .ins(OpKind::Addi, &["x1", "x0", "2"])
        .ins(OpKind::Add, &["x3", "x1", "x1"])
        .build();
    let mut ctx = TestContext::new(program);
    ctx.run_to_end();
    assert_eq!(ctx.reg("x1"), 2);
    assert_eq!(ctx.reg("x3"), 4);
}

#[test]
fn test_writes_to_zero_register_are_discarded() {
    let program = ProgramBuilder::new()
        .ins(OpKind::Addi, &["x0", "x0", "5"])
        .ins(OpKind::Add, &["x1", "x0", "x0"])
        .build();
    let mut ctx = TestContext::new(program);
    ctx.run_to_end();
    assert_eq!(ctx.reg("x0"), 0);
    assert_eq!(ctx.reg("x1"), 0);
}

#[test]
fn test_all_tags_return_to_free_after_drain() {
    let program = ProgramBuilder::new()
        .ins(OpKind::Add, &["x1", "x2", "x3"])
        .ins(OpKind::Mul, &["x5", "x1", "x1"])
        .ins(OpKind::Sub, &["x6", "x5", "x1"])
        .ins(OpKind::Add, &["x1", "x6", "x2"])
        .build();
    let mut ctx = TestContext::new(program);
    ctx.run_to_end();
    assert_eq!(ctx.reg("x6"), 31 * 31 - 31);
    assert_eq!(ctx.reg("x1"), 31 * 31 - 31 + 25);
    let state = ctx.state();
    assert_eq!(state.rename.free_count(), state.registers.tag_count());
    assert_eq!(state.rename.mappings().count(), 0);
}
