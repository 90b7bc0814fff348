//! Control Flow Tests.
//!
//! Jumps and conditional branches against the gshare predictor: cold
//! mispredictions, BTB training, global history repair, and restoring all
//! of it on step-back.

use crate::common::builder::{ProgramBuilder, loop_program};
use crate::common::harness::TestContext;
use ooosim_core::config::{Config, PredictorConfig, PredictorKind};
use ooosim_core::core::units::bru::BranchPredictor;
use ooosim_core::isa::OpKind;
use ooosim_core::Program;

fn jump_program() -> Program {
    ProgramBuilder::new()
        .ins(OpKind::Jal, &["x1", "target"])
        .ins(OpKind::Addi, &["x2", "x0", "1"])
        .label("target")
        .ins(OpKind::Addi, &["x3", "x0", "7"])
        .build()
}

#[test]
fn test_cold_jump_squashes_fall_through() {
    let mut ctx = TestContext::new(jump_program());
    ctx.run_to_end();
    assert_eq!(ctx.reg("x1"), 4);
    assert_eq!(ctx.reg("x2"), 0);
    assert_eq!(ctx.reg("x3"), 7);

    let stats = ctx.sim.stats();
    assert_eq!(stats.branch_mispredictions, 1);
    assert_eq!(stats.flushes, 1);
    assert!(stats.instructions_squashed >= 1);
    assert_eq!(stats.instructions_committed, 2);
}

#[test]
fn test_resolution_trains_btb_and_history() {
    let mut ctx = TestContext::new(jump_program());
    ctx.run_to_end();
    let predictor = &ctx.state().predictor;
    assert_eq!(predictor.btb().lookup(0), Some(8));
    assert_eq!(predictor.history(), 1);
}

#[test]
fn test_step_back_restores_predictor() {
    let mut ctx = TestContext::new(jump_program());
    ctx.step(7);
    assert_eq!(ctx.state().predictor.btb().lookup(0), Some(8));

    ctx.back(1);
    assert_eq!(ctx.state().predictor.btb().lookup(0), None);
    assert_eq!(ctx.state().predictor.history(), 0);
    assert!(ctx.state().predictor.btb().is_empty());
}

#[test]
fn test_countdown_loop_commits_every_iteration() {
    let mut ctx = TestContext::new(loop_program());
    ctx.run_to_end();
    assert_eq!(ctx.reg("x1"), 0);
    assert_eq!(ctx.reg("x5"), 9);

    let stats = ctx.sim.stats();
    assert_eq!(stats.instructions_committed, 8);
    assert_eq!(stats.committed_branch, 3);
    assert_eq!(stats.branches_resolved, 3);
    assert_eq!(stats.branch_mispredictions, 2);
    assert!(stats.instructions_fetched > stats.instructions_committed);
}

#[test]
fn test_static_predictor_reaches_same_result() {
    let config = Config {
        predictor: PredictorConfig {
            kind: PredictorKind::Static,
            ..PredictorConfig::default()
        },
        ..TestContext::reference_config()
    };
    let mut ctx = TestContext::with_config(config, loop_program());
    ctx.run_to_end();
    assert_eq!(ctx.reg("x1"), 0);
    assert_eq!(ctx.reg("x5"), 9);
    assert_eq!(ctx.sim.stats().instructions_committed, 8);
}

#[test]
fn test_indirect_jump_links_and_redirects() {
    let program = ProgramBuilder::new()
        .ins(OpKind::Addi, &["x6", "x0", "12"])
        .ins(OpKind::Jalr, &["x1", "x6", "0"])
        .ins(OpKind::Addi, &["x2", "x0", "1"])
        .ins(OpKind::Addi, &["x3", "x0", "7"])
        .build();
    let mut ctx = TestContext::new(program);
    ctx.run_to_end();
    assert_eq!(ctx.reg("x1"), 8);
    assert_eq!(ctx.reg("x2"), 25);
    assert_eq!(ctx.reg("x3"), 7);
}

#[test]
fn test_jump_to_misaligned_address_drains() {
    let program = ProgramBuilder::new()
        .ins(OpKind::Addi, &["x6", "x0", "6"])
        .ins(OpKind::Jalr, &["x1", "x6", "0"])
        .ins(OpKind::Addi, &["x9", "x0", "1"])
        .build();
    let mut ctx = TestContext::new(program);
    ctx.run_to_end();
    assert_eq!(ctx.state().pc, 6);
    assert_eq!(ctx.reg("x1"), 8);
    assert_eq!(ctx.reg("x9"), 0);
    assert_eq!(ctx.sim.stats().instructions_committed, 2);
}

#[test]
fn test_wrong_path_work_never_reaches_memory() {
    let program = ProgramBuilder::new()
        .ins(OpKind::Beq, &["x0", "x0", "skip"])
        .ins(OpKind::Sw, &["x3", "x2", "0"])
        .label("skip")
        .ins(OpKind::Lw, &["x5", "x2", "0"])
        .build();
    let mut ctx = TestContext::new(program);
    ctx.run_to_end();
    assert_eq!(ctx.state().memory_value(25, 4), 0);
    assert_eq!(ctx.reg("x5"), 0);
    assert_eq!(ctx.sim.stats().memory_writes, 0);
}
