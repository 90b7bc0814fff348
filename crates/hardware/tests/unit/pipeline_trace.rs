//! Pipeline Trace Tests.
//!
//! Follows a single `add` through every stage of the default
//! configuration, one cycle at a time.

use crate::common::builder::add_program;
use crate::common::harness::TestContext;
use ooosim_core::config::UnitClass;
use ooosim_core::core::arch::Readiness;

const RENAMED: &str = "add t0 x2 x3";

#[test]
fn test_add_moves_one_stage_per_cycle() {
    let mut ctx = TestContext::new(add_program());
    assert_eq!(ctx.state().cycle, 0);

    ctx.step(1);
    assert_eq!(ctx.state().fetched_code(), vec!["add x1 x2 x3"]);
    assert_eq!(ctx.state().pc, 4);

    ctx.step(1);
    assert!(ctx.state().fetched_code().is_empty());
    assert_eq!(ctx.state().renamed_latch_code(), vec![RENAMED]);
    assert_eq!(ctx.readiness("t0"), Readiness::Allocated);

    ctx.step(1);
    assert_eq!(ctx.state().window_code(UnitClass::Integer), vec![RENAMED]);
    assert_eq!(ctx.state().rob_code(), vec![RENAMED]);

    ctx.step(1);
    assert!(ctx.state().window_code(UnitClass::Integer).is_empty());
    assert_eq!(ctx.state().unit_code("FX1").as_deref(), Some(RENAMED));

    ctx.step(1);
    assert_eq!(ctx.state().unit_code("FX1").as_deref(), Some(RENAMED));
    assert_eq!(ctx.readiness("t0"), Readiness::Allocated);

    ctx.step(1);
    assert_eq!(ctx.state().unit_code("FX1"), None);
    assert_eq!(ctx.readiness("t0"), Readiness::Executed);
    assert_eq!(ctx.reg("t0"), 31);
    assert_eq!(ctx.reg("x1"), 0);

    ctx.step(1);
    assert_eq!(ctx.reg("x1"), 31);
    assert_eq!(ctx.readiness("t0"), Readiness::Free);
    assert!(ctx.state().rob_code().is_empty());
    assert!(ctx.sim.is_finished());
    assert_eq!(ctx.sim.stats().instructions_committed, 1);
}

#[test]
fn test_add_step_back_restores_earlier_stages() {
    let mut ctx = TestContext::new(add_program());
    ctx.step(7);
    assert_eq!(ctx.reg("x1"), 31);

    ctx.back(1);
    assert_eq!(ctx.sim.cycle(), 6);
    assert_eq!(ctx.readiness("t0"), Readiness::Executed);
    assert_eq!(ctx.reg("x1"), 0);

    ctx.back(1);
    assert_eq!(ctx.sim.cycle(), 5);
    assert_eq!(ctx.state().unit_code("FX1").as_deref(), Some(RENAMED));
}

#[test]
fn test_architectural_registers_start_ready() {
    let ctx = TestContext::new(add_program());
    for name in ["x0", "x2", "x31", "f1", "f31"] {
        assert_eq!(ctx.readiness(name), Readiness::Assigned, "{name}");
    }
    assert_eq!(ctx.readiness("t0"), Readiness::Free);
    assert_eq!(ctx.reg("x4"), -2);
}

#[test]
fn test_run_reports_cycles_until_drained() {
    let mut ctx = TestContext::new(add_program());
    assert_eq!(ctx.cycles_to_end(), 7);
    assert_eq!(ctx.sim.stats().cycles, 7);
    assert!((ctx.sim.stats().ipc() - 1.0 / 7.0).abs() < 1e-9);
}
