//! Data Cache Tests.
//!
//! Loads and stores through the optional set-associative cache: hit and
//! miss accounting, the latency it saves, and restoring cache contents on
//! step-back.

use crate::common::builder::ProgramBuilder;
use crate::common::harness::TestContext;
use ooosim_core::config::{Config, ReplacementPolicy};
use ooosim_core::isa::OpKind;
use ooosim_core::Program;

fn cached_config(enabled: bool) -> Config {
    let mut config = TestContext::reference_config();
    config.memory.load_latency = 20;
    config.memory.store_latency = 20;
    config.memory.cache.enabled = enabled;
    config
}

/// Two loads from the same 64-byte line.
fn same_line_loads() -> Program {
    ProgramBuilder::new()
        .ins(OpKind::Lw, &["x5", "x2", "0"])
        .ins(OpKind::Lw, &["x6", "x2", "4"])
        .build()
}

#[test]
fn test_second_load_to_a_line_hits() {
    let mut ctx = TestContext::with_config(cached_config(true), same_line_loads());
    ctx.run_to_end();
    let stats = ctx.sim.stats();
    assert_eq!(stats.cache_misses, 1);
    assert_eq!(stats.cache_hits, 1);
    assert!(ctx.state().memory.cache.as_ref().unwrap().contains(25));
}

#[test]
fn test_cache_shortens_repeated_access() {
    let cached = TestContext::with_config(cached_config(true), same_line_loads()).cycles_to_end();
    let uncached =
        TestContext::with_config(cached_config(false), same_line_loads()).cycles_to_end();
    assert!(cached < uncached, "cached {cached} vs uncached {uncached}");
}

#[test]
fn test_uncached_run_counts_nothing() {
    let mut ctx = TestContext::with_config(cached_config(false), same_line_loads());
    ctx.run_to_end();
    assert_eq!(ctx.sim.stats().cache_hits + ctx.sim.stats().cache_misses, 0);
    assert!(ctx.state().memory.cache.is_none());
}

#[test]
fn test_store_fills_line_for_later_load() {
    // The multiply chain delays the load until the store has retired.
    let program = ProgramBuilder::new()
        .ins(OpKind::Sw, &["x3", "x2", "0"])
        .ins(OpKind::Mul, &["x8", "x3", "x0"])
        .ins(OpKind::Mul, &["x8", "x8", "x8"])
        .ins(OpKind::Mul, &["x8", "x8", "x8"])
        .ins(OpKind::Mul, &["x8", "x8", "x8"])
        .ins(OpKind::Mul, &["x8", "x8", "x8"])
        .ins(OpKind::Add, &["x9", "x8", "x2"])
        .ins(OpKind::Lw, &["x5", "x9", "0"])
        .build();
    let mut config = TestContext::reference_config();
    config.memory.cache.enabled = true;
    config.memory.cache.policy = ReplacementPolicy::Fifo;
    let mut ctx = TestContext::with_config(config, program);
    ctx.run_to_end();
    assert_eq!(ctx.reg("x5"), 6);
    let stats = ctx.sim.stats();
    assert_eq!(stats.memory_reads, 1);
    assert_eq!(stats.loads_forwarded, 0);
    assert_eq!((stats.cache_misses, stats.cache_hits), (1, 1));
}

#[test]
fn test_step_back_restores_cache_contents() {
    let mut ctx = TestContext::with_config(cached_config(true), same_line_loads());
    let initial = ctx.state().clone();
    ctx.run_to_end();
    let cycles = ctx.state().cycle;
    ctx.back(cycles);
    assert!(!ctx.state().memory.cache.as_ref().unwrap().contains(25));
    assert_eq!(ctx.sim.stats().cache_misses, 0);
    assert_eq!(ctx.state(), &initial);
}
