//! Cache replacement policies.
//!
//! Policies are plain data so the cache, and with it the whole core state,
//! stays `Clone + PartialEq`. [`Policy`] dispatches to the configured one.

/// First-in, first-out replacement.
pub mod fifo;

/// Least-recently-used replacement.
pub mod lru;

pub use fifo::FifoPolicy;
pub use lru::LruPolicy;

use crate::config::ReplacementPolicy as PolicyKind;
use serde::Serialize;

/// Per-set bookkeeping that picks the way to evict.
pub trait ReplacementPolicy {
    /// Records a hit on `way` of `set`.
    fn touch(&mut self, set: usize, way: usize);

    /// Records that `way` of `set` was just filled.
    fn fill(&mut self, set: usize, way: usize);

    /// Way of `set` to evict next.
    fn victim(&self, set: usize) -> usize;
}

/// The configured replacement policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Policy {
    /// See [`FifoPolicy`].
    Fifo(FifoPolicy),
    /// See [`LruPolicy`].
    Lru(LruPolicy),
}

impl Policy {
    /// Builds the policy `kind` for `sets` sets of `ways` ways.
    pub fn new(kind: PolicyKind, sets: usize, ways: usize) -> Self {
        match kind {
            PolicyKind::Fifo => Self::Fifo(FifoPolicy::new(sets, ways)),
            PolicyKind::Lru => Self::Lru(LruPolicy::new(sets, ways)),
        }
    }
}

impl ReplacementPolicy for Policy {
    fn touch(&mut self, set: usize, way: usize) {
        match self {
            Self::Fifo(p) => p.touch(set, way),
            Self::Lru(p) => p.touch(set, way),
        }
    }

    fn fill(&mut self, set: usize, way: usize) {
        match self {
            Self::Fifo(p) => p.fill(set, way),
            Self::Lru(p) => p.fill(set, way),
        }
    }

    fn victim(&self, set: usize) -> usize {
        match self {
            Self::Fifo(p) => p.victim(set),
            Self::Lru(p) => p.victim(set),
        }
    }
}
