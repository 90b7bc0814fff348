//! Branch prediction unit (BRU) implementations.
//!
//! This module contains the static and gshare predictors and the branch
//! target buffer (BTB) they share.

pub use self::branch_predictor::{BranchPredictor, Prediction};

/// Branch predictor trait.
pub mod branch_predictor;

/// Branch Target Buffer for storing predicted branch targets.
pub mod btb;

/// Global history branch predictor (gshare algorithm).
pub mod gshare;

/// Static branch predictor (always not-taken).
pub mod static_bp;

use self::{btb::Btb, gshare::GSharePredictor, static_bp::StaticPredictor};
use crate::config::{PredictorConfig, PredictorKind};
use serde::Serialize;

/// Enum wrapper for static dispatch of branch predictors.
///
/// The wrapper is `Clone + PartialEq` so the predictor can be snapshotted
/// and compared along with the rest of the core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum BranchPredictorWrapper {
    /// Always not-taken for conditional branches.
    Static(StaticPredictor),
    /// Global-history predictor.
    GShare(GSharePredictor),
}

impl BranchPredictorWrapper {
    /// Creates the predictor selected by `config`.
    pub fn new(config: &PredictorConfig) -> Self {
        match config.kind {
            PredictorKind::Static => Self::Static(StaticPredictor::new(config.btb_size)),
            PredictorKind::GShare => Self::GShare(GSharePredictor::new(config)),
        }
    }

    /// The BTB of the active predictor.
    pub const fn btb(&self) -> &Btb {
        match self {
            Self::Static(bp) => bp.btb(),
            Self::GShare(bp) => bp.btb(),
        }
    }
}

impl BranchPredictor for BranchPredictorWrapper {
    #[inline]
    fn predict(&self, pc: u64, unconditional: bool) -> Prediction {
        match self {
            Self::Static(bp) => bp.predict(pc, unconditional),
            Self::GShare(bp) => bp.predict(pc, unconditional),
        }
    }

    #[inline]
    fn speculate(&mut self, taken: bool) {
        match self {
            Self::Static(bp) => bp.speculate(taken),
            Self::GShare(bp) => bp.speculate(taken),
        }
    }

    #[inline]
    fn history(&self) -> u64 {
        match self {
            Self::Static(bp) => bp.history(),
            Self::GShare(bp) => bp.history(),
        }
    }

    #[inline]
    fn restore_history(&mut self, history: u64) {
        match self {
            Self::Static(bp) => bp.restore_history(history),
            Self::GShare(bp) => bp.restore_history(history),
        }
    }

    #[inline]
    fn update(&mut self, pc: u64, history: u64, taken: bool, target: u64) {
        match self {
            Self::Static(bp) => bp.update(pc, history, taken, target),
            Self::GShare(bp) => bp.update(pc, history, taken, target),
        }
    }
}
