//! Simulator: the core state plus its snapshot history.
//!
//! Every forward step pushes a clone of the pre-step state; a backward step
//! pops it. Restoring a snapshot is an assignment, so a step back yields a
//! state equal to the one before the matching forward step.

use super::snapshot::SnapshotStack;
use crate::common::error::{Result, SimError};
use crate::config::Config;
use crate::core::CpuState;
use crate::isa::Program;
use crate::stats::SimStats;

/// Steppable simulator with exact step-back.
#[derive(Debug)]
pub struct Simulator {
    state: CpuState,
    history: SnapshotStack,
}

impl Simulator {
    /// Creates a simulator at cycle 0.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or the program names a
    /// register that does not exist.
    pub fn new(config: Config, program: Program) -> Result<Self> {
        let history = SnapshotStack::new(config.general.history_limit);
        let state = CpuState::new(config, program)?;
        tracing::info!(
            instructions = state.program().len(),
            units = state.units.units().len(),
            "simulator created"
        );
        Ok(Self { state, history })
    }

    /// Advances one cycle.
    pub fn step(&mut self) {
        self.history.push(self.state.clone());
        self.state.tick();
    }

    /// Advances `n` cycles.
    pub fn step_n(&mut self, n: u64) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Restores the state from before the last forward step.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NoEarlierCycle`] at cycle 0 or once the history
    /// limit has discarded the earlier snapshot. The state is unchanged.
    pub fn step_back(&mut self) -> Result<()> {
        let Some(previous) = self.history.pop() else {
            tracing::warn!(cycle = self.state.cycle, "no earlier cycle to step back to");
            return Err(SimError::NoEarlierCycle {
                cycle: self.state.cycle,
            });
        };
        self.state = previous;
        tracing::debug!(cycle = self.state.cycle, "stepped back");
        Ok(())
    }

    /// Steps back `n` cycles, or not at all if fewer are recorded.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NoEarlierCycle`] without changing the state when
    /// fewer than `n` snapshots are held.
    pub fn step_back_n(&mut self, n: u64) -> Result<()> {
        if n > self.history.len() as u64 {
            tracing::warn!(
                cycle = self.state.cycle,
                requested = n,
                available = self.history.len(),
                "not enough history to step back"
            );
            return Err(SimError::NoEarlierCycle {
                cycle: self.state.cycle,
            });
        }
        for _ in 0..n {
            self.step_back()?;
        }
        Ok(())
    }

    /// Steps until the program drains or `max_cycles` elapse.
    ///
    /// Returns the number of cycles stepped.
    pub fn run(&mut self, max_cycles: u64) -> u64 {
        let mut stepped = 0;
        while stepped < max_cycles && !self.state.is_finished() {
            self.step();
            stepped += 1;
        }
        if self.state.is_finished() {
            tracing::info!(
                cycle = self.state.cycle,
                committed = self.state.stats.instructions_committed,
                "program finished"
            );
        } else {
            tracing::warn!(cycle = self.state.cycle, max_cycles, "cycle limit reached");
        }
        stepped
    }

    /// Returns true once the program has drained.
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Current cycle.
    pub const fn cycle(&self) -> u64 {
        self.state.cycle
    }

    /// Current state.
    pub const fn state(&self) -> &CpuState {
        &self.state
    }

    /// Current statistics.
    pub const fn stats(&self) -> &SimStats {
        &self.state.stats
    }

    /// Number of cycles that can be stepped back.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}
