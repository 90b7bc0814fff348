//! Simulation driver and step-back history.

/// Bounded stack of core snapshots.
pub mod snapshot;

/// Forward and backward stepping over a [`CpuState`](crate::core::CpuState).
pub mod simulator;

pub use simulator::Simulator;
pub use snapshot::SnapshotStack;
