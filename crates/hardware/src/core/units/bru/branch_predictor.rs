//! Branch Predictor Interface.
//!
//! This module defines the `BranchPredictor` trait used by the fetch stage
//! and the branch units. Predictions are made at fetch, the global history
//! is shifted speculatively right away, and the predictor is trained when
//! the branch resolves.

/// Direction and target predicted for a control instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Prediction {
    /// Predicted taken. Only ever true when a target is known.
    pub taken: bool,
    /// Predicted target address when `taken`.
    pub target: u64,
}

/// Trait for branch prediction algorithms.
///
/// Implementations must be cheap to clone: the whole predictor is part of
/// every cycle snapshot.
pub trait BranchPredictor {
    /// Predicts the control instruction at `pc`.
    ///
    /// # Arguments
    ///
    /// * `pc` - Address of the branch or jump.
    /// * `unconditional` - True for jumps, which are taken whenever the BTB
    ///   knows their target.
    fn predict(&self, pc: u64, unconditional: bool) -> Prediction;

    /// Shifts a predicted direction into the global history.
    fn speculate(&mut self, taken: bool);

    /// Current global history value.
    fn history(&self) -> u64;

    /// Restores the global history to a checkpoint taken at fetch.
    fn restore_history(&mut self, history: u64);

    /// Trains the predictor with a resolved outcome.
    ///
    /// # Arguments
    ///
    /// * `pc` - Address of the branch.
    /// * `history` - Global history when the branch was predicted.
    /// * `taken` - Actual direction.
    /// * `target` - Actual target; recorded in the BTB when taken.
    fn update(&mut self, pc: u64, history: u64, taken: bool, target: u64);
}
