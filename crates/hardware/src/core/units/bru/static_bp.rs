//! Static Branch Predictor.
//!
//! Conditional branches always fall through. Jumps use the BTB. There is
//! no history, so the history hooks are no-ops.

use super::{BranchPredictor, Prediction, btb::Btb};
use serde::Serialize;

/// Static Branch Predictor structure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StaticPredictor {
    btb: Btb,
}

impl StaticPredictor {
    /// Creates a predictor with a `btb_size`-entry BTB.
    pub fn new(btb_size: usize) -> Self {
        Self {
            btb: Btb::new(btb_size),
        }
    }

    /// The BTB.
    pub const fn btb(&self) -> &Btb {
        &self.btb
    }
}

impl BranchPredictor for StaticPredictor {
    fn predict(&self, pc: u64, unconditional: bool) -> Prediction {
        match self.btb.lookup(pc) {
            Some(target) if unconditional => Prediction {
                taken: true,
                target,
            },
            _ => Prediction::default(),
        }
    }

    fn speculate(&mut self, _taken: bool) {}

    fn history(&self) -> u64 {
        0
    }

    fn restore_history(&mut self, _history: u64) {}

    fn update(&mut self, pc: u64, _history: u64, taken: bool, target: u64) {
        if taken {
            self.btb.update(pc, target);
        }
    }
}
