//! Step-Back Tests.
//!
//! Stepping back must restore the complete core state, bit for bit, and
//! replaying the same cycles must reproduce the same future.

use crate::common::builder::{add_program, loop_program, mixed_program};
use crate::common::harness::TestContext;
use ooosim_core::Program;
use ooosim_core::common::SimError;
use ooosim_core::config::{Config, GeneralConfig};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

#[test]
fn test_step_back_at_cycle_zero_fails() {
    let mut ctx = TestContext::new(add_program());
    let before = ctx.state().clone();
    let err = ctx.sim.step_back().unwrap_err();
    assert!(matches!(err, SimError::NoEarlierCycle { cycle: 0 }));
    assert_eq!(ctx.state(), &before);
}

#[test]
fn test_step_back_n_is_all_or_nothing() {
    let mut ctx = TestContext::new(add_program());
    ctx.step(3);
    let before = ctx.state().clone();
    assert!(ctx.sim.step_back_n(4).is_err());
    assert_eq!(ctx.state(), &before);
    assert_eq!(ctx.sim.history_len(), 3);
}

#[test]
fn test_history_limit_discards_oldest_cycles() {
    let config = Config {
        general: GeneralConfig {
            history_limit: Some(2),
            ..GeneralConfig::default()
        },
        ..TestContext::reference_config()
    };
    let mut ctx = TestContext::with_config(config, add_program());
    ctx.step(5);
    assert_eq!(ctx.sim.history_len(), 2);
    ctx.back(2);
    assert_eq!(ctx.sim.cycle(), 3);
    assert!(ctx.sim.step_back().is_err());
}

#[test]
fn test_snapshots_share_unchanged_memory() {
    let mut ctx = TestContext::new(add_program());
    let before = ctx.state().clone();
    ctx.step(1);
    assert!(ctx.state().memory.shares_storage_with(&before.memory));
}

#[rstest]
#[case::add(add_program())]
#[case::countdown(loop_program())]
#[case::mixed(mixed_program())]
fn test_full_rewind_restores_initial_state(#[case] program: Program) {
    let mut ctx = TestContext::new(program);
    let initial = ctx.state().clone();
    let cycles = ctx.cycles_to_end();
    ctx.back(cycles);
    assert_eq!(ctx.state(), &initial);
}

#[rstest]
#[case::countdown(loop_program())]
#[case::mixed(mixed_program())]
fn test_replay_after_rewind_is_deterministic(#[case] program: Program) {
    let mut ctx = TestContext::new(program);
    ctx.step(12);
    let forward = ctx.state().clone();
    ctx.back(7);
    ctx.step(7);
    assert_eq!(ctx.state(), &forward);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_forward_then_back_is_identity(start in 0u64..30, n in 1u64..30) {
        let mut ctx = TestContext::new(mixed_program());
        ctx.step(start);
        let before = ctx.state().clone();
        ctx.step(n);
        ctx.back(n);
        prop_assert_eq!(ctx.state(), &before);
    }

    #[test]
    fn test_back_matches_fresh_run(forward in 1u64..40, back in 0u64..40) {
        let back = back.min(forward);
        let mut ctx = TestContext::new(mixed_program());
        ctx.step(forward);
        ctx.back(back);

        let mut fresh = TestContext::new(mixed_program());
        fresh.step(forward - back);
        prop_assert_eq!(ctx.state(), fresh.state());
    }
}

#[test]
fn test_mixed_program_result() {
    let mut ctx = TestContext::new(mixed_program());
    ctx.run_to_end();
    assert_eq!(ctx.reg("x1"), 31);
    assert_eq!(ctx.reg("x5"), 31);
    assert_eq!(ctx.reg("x6"), 0);
    assert_eq!(ctx.reg("x7"), 32);
    assert_eq!(ctx.reg("x8"), 0);
    assert_eq!(ctx.reg("x9"), 62);
    assert!((ctx.fp("f6") - 8.625).abs() < f64::EPSILON);
}
