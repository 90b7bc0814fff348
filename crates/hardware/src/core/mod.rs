//! Out-of-order core.
//!
//! This module contains the core state and its per-cycle step, the
//! pipeline structures the stages move instructions through, the register
//! file, and the units (branch prediction, data memory) the stages consult.

/// Register file and register readiness.
pub mod arch;

/// Core state and the pipeline stages.
pub mod cpu;

/// Pipeline structures (rename table, ROB, issue windows, load/store buffers).
pub mod pipeline;

/// Branch predictors and the memory model.
pub mod units;

pub use self::cpu::CpuState;
