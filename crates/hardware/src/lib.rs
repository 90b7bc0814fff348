//! Cycle-level out-of-order superscalar core simulator.
//!
//! This crate models a small RISC-V-flavoured core with the following:
//! 1. **Front end:** Fetch groups with branch prediction, register renaming onto speculative tags.
//! 2. **Back end:** Reorder buffer, per-class issue windows and functional units.
//! 3. **Memory:** Load and store buffers with forwarding, late hazard squashes and a latency model.
//! 4. **Simulation:** Whole-state snapshots for exact step-back, configuration and statistics.

/// Common types (ids, errors).
pub mod common;
/// Simulator configuration (defaults, enums, JSON loading).
pub mod config;
/// Out-of-order core (state, stages, pipeline structures, units).
pub mod core;
/// Instruction set (operations, instruction descriptors, programs).
pub mod isa;
/// Simulation driver and snapshot history.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or load JSON.
pub use crate::config::Config;
/// Complete mutable state of the core.
pub use crate::core::CpuState;
/// Assembled program.
pub use crate::isa::Program;
/// Steppable simulator with exact step-back.
pub use crate::sim::Simulator;
