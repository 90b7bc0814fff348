//! First-In, First-Out (FIFO) Replacement Policy.
//!
//! Evicts the line filled longest ago, regardless of how recently it was
//! hit. Each set keeps a round-robin pointer that advances on every fill.

use super::ReplacementPolicy;
use serde::Serialize;

/// FIFO policy state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FifoPolicy {
    /// Next way to be evicted, per set.
    next_way: Vec<usize>,
    ways: usize,
}

impl FifoPolicy {
    /// Creates the policy for `sets` sets of `ways` ways.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            next_way: vec![0; sets],
            ways,
        }
    }
}

impl ReplacementPolicy for FifoPolicy {
    fn touch(&mut self, _set: usize, _way: usize) {}

    fn fill(&mut self, set: usize, way: usize) {
        if self.next_way[set] == way {
            self.next_way[set] = (way + 1) % self.ways;
        }
    }

    fn victim(&self, set: usize) -> usize {
        self.next_way[set]
    }
}
