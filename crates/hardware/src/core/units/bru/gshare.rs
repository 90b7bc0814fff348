//! GShare Branch Predictor.
//!
//! GShare correlates global branch history with the program counter using an XOR
//! hash into a table of two-bit saturating counters. Jump targets and taken
//! branch targets come from the BTB.

use super::{BranchPredictor, Prediction, btb::Btb};
use crate::config::PredictorConfig;
use serde::Serialize;

/// GShare Predictor structure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GSharePredictor {
    /// Global History Register; the newest outcome is bit 0.
    ghr: u64,
    history_mask: u64,
    /// Pattern History Table of two-bit counters.
    pht: Vec<u8>,
    btb: Btb,
}

impl GSharePredictor {
    /// Creates a predictor sized by `config`.
    pub fn new(config: &PredictorConfig) -> Self {
        Self {
            ghr: 0,
            history_mask: (1u64 << config.history_bits) - 1,
            pht: vec![config.initial_state.value(); 1 << config.pht_bits],
            btb: Btb::new(config.btb_size),
        }
    }

    fn index(&self, pc: u64, history: u64) -> usize {
        (((pc >> 2) ^ history) as usize) & (self.pht.len() - 1)
    }

    /// Counter consulted for `pc` under the current history.
    pub fn counter(&self, pc: u64) -> u8 {
        self.pht[self.index(pc, self.ghr)]
    }

    /// The BTB.
    pub const fn btb(&self) -> &Btb {
        &self.btb
    }
}

impl BranchPredictor for GSharePredictor {
    fn predict(&self, pc: u64, unconditional: bool) -> Prediction {
        let Some(target) = self.btb.lookup(pc) else {
            return Prediction::default();
        };
        let taken = unconditional || self.counter(pc) >= 2;
        Prediction { taken, target }
    }

    fn speculate(&mut self, taken: bool) {
        self.ghr = ((self.ghr << 1) | u64::from(taken)) & self.history_mask;
    }

    fn history(&self) -> u64 {
        self.ghr
    }

    fn restore_history(&mut self, history: u64) {
        self.ghr = history & self.history_mask;
    }

    fn update(&mut self, pc: u64, history: u64, taken: bool, target: u64) {
        let idx = self.index(pc, history);
        let counter = &mut self.pht[idx];
        if taken {
            *counter = (*counter + 1).min(3);
        } else {
            *counter = counter.saturating_sub(1);
        }
        if taken {
            self.btb.update(pc, target);
        }
    }
}
