//! Least Recently Used (LRU) Replacement Policy.
//!
//! Each set keeps a usage stack: index 0 is the most recently used way,
//! the last index the least recently used one.

use super::ReplacementPolicy;
use serde::Serialize;

/// LRU policy state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LruPolicy {
    usage: Vec<Vec<usize>>,
}

impl LruPolicy {
    /// Creates the policy for `sets` sets of `ways` ways.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            usage: (0..sets).map(|_| (0..ways).collect()).collect(),
        }
    }

    fn promote(&mut self, set: usize, way: usize) {
        let stack = &mut self.usage[set];
        if let Some(pos) = stack.iter().position(|&w| w == way) {
            let _ = stack.remove(pos);
        }
        stack.insert(0, way);
    }
}

impl ReplacementPolicy for LruPolicy {
    fn touch(&mut self, set: usize, way: usize) {
        self.promote(set, way);
    }

    fn fill(&mut self, set: usize, way: usize) {
        self.promote(set, way);
    }

    fn victim(&self, set: usize) -> usize {
        self.usage[set].last().copied().unwrap_or(0)
    }
}
