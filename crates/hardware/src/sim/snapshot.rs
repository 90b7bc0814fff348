//! Bounded stack of whole-core snapshots.

use crate::core::CpuState;
use std::collections::VecDeque;

/// Past states, most recent last.
///
/// With a limit set, the oldest snapshot is dropped once the stack is full,
/// so stepping back can only reach that many cycles.
#[derive(Clone, Debug, Default)]
pub struct SnapshotStack {
    snapshots: VecDeque<CpuState>,
    limit: Option<usize>,
}

impl SnapshotStack {
    /// Creates an empty stack holding at most `limit` snapshots.
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            snapshots: VecDeque::new(),
            limit,
        }
    }

    /// Records `state` as the most recent snapshot.
    pub fn push(&mut self, state: CpuState) {
        if self.limit == Some(0) {
            return;
        }
        if self.limit.is_some_and(|limit| self.snapshots.len() >= limit) {
            let _ = self.snapshots.pop_front();
        }
        self.snapshots.push_back(state);
    }

    /// Removes and returns the most recent snapshot.
    pub fn pop(&mut self) -> Option<CpuState> {
        self.snapshots.pop_back()
    }

    /// Number of snapshots held.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns true if no snapshot is held.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Most recent snapshot.
    pub fn peek(&self) -> Option<&CpuState> {
        self.snapshots.back()
    }

    /// Drops every snapshot.
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// Maximum number of snapshots kept, if bounded.
    pub const fn limit(&self) -> Option<usize> {
        self.limit
    }
}
