//! Reorder Buffer (ROB).
//!
//! The ROB records every dispatched instruction in program order. It
//! enforces in-order commit over out-of-order completion, tracks which
//! entries still sit behind an unresolved branch, and drives squashing.
//! Entries are referenced by [`InstrId`]; the ROB never owns instructions.

use crate::common::ids::InstrId;
use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};

/// State flags of a ROB entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RobFlags {
    /// Cleared when the instruction is squashed.
    pub valid: bool,
    /// Set until the instruction's result is produced.
    pub busy: bool,
    /// Set while an older branch is unresolved.
    pub speculative: bool,
}

/// A ROB entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RobEntry {
    /// Instruction the entry tracks.
    pub id: InstrId,
    /// Entry flags.
    pub flags: RobFlags,
}

impl RobEntry {
    /// Finished, non-speculative and not squashed.
    pub const fn is_ready_to_be_committed(&self) -> bool {
        !self.flags.busy && !self.flags.speculative && self.flags.valid
    }

    /// Squashed and no longer speculative.
    pub const fn is_ready_to_be_removed(&self) -> bool {
        !self.flags.speculative && !self.flags.valid
    }
}

/// Reorder buffer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReorderBuffer {
    entries: VecDeque<RobEntry>,
    capacity: usize,
    /// Dispatched branches whose direction is not yet known.
    unresolved: BTreeSet<InstrId>,
}

impl ReorderBuffer {
    /// Creates an empty ROB holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            unresolved: BTreeSet::new(),
        }
    }

    /// Returns true when no entry can be dispatched.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Returns true if the ROB holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Maximum number of entries.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true while any dispatched branch is unresolved.
    ///
    /// Instructions dispatched in this state are speculative.
    pub fn is_speculating(&self) -> bool {
        !self.unresolved.is_empty()
    }

    /// Appends an entry at the tail, `valid` and `busy`.
    ///
    /// Dispatching into a full ROB or out of program order is a pipeline bug;
    /// callers stall on [`is_full`](Self::is_full) instead.
    pub fn dispatch(&mut self, id: InstrId, speculative: bool) -> InstrId {
        assert!(!self.is_full(), "dispatch into a full ROB");
        assert!(
            self.entries.back().is_none_or(|tail| tail.id < id),
            "ROB dispatch out of program order"
        );
        self.entries.push_back(RobEntry {
            id,
            flags: RobFlags {
                valid: true,
                busy: true,
                speculative,
            },
        });
        id
    }

    /// Records `id` as an unresolved branch; younger entries are speculative.
    pub fn add_branch(&mut self, id: InstrId) {
        let _ = self.unresolved.insert(id);
    }

    /// Clears `busy` once the instruction's result is produced.
    pub fn mark_executed(&mut self, id: InstrId) {
        if let Some(entry) = self.entry_mut(id) {
            entry.flags.busy = false;
        }
    }

    /// Updates an entry's speculative flag after an older branch resolves.
    pub fn resolve_speculation(&mut self, id: InstrId, still_speculative: bool) {
        if let Some(entry) = self.entry_mut(id) {
            entry.flags.speculative = still_speculative && entry.flags.valid;
        }
    }

    /// Resolves branch `id`, clearing speculation up to the next unresolved branch.
    pub fn resolve_branch(&mut self, id: InstrId) {
        if !self.unresolved.remove(&id) {
            return;
        }
        let younger: Vec<InstrId> = self
            .entries
            .iter()
            .filter(|e| e.id > id && e.flags.speculative)
            .map(|e| e.id)
            .collect();
        for entry in younger {
            let still = self.unresolved.range(..entry).next().is_some();
            self.resolve_speculation(entry, still);
        }
    }

    /// Invalidates `first` and every younger entry.
    ///
    /// Invalidated entries lose their speculative flag so that
    /// [`purge_removable`](Self::purge_removable) discards them.
    pub fn invalidate_from(&mut self, first: InstrId) {
        for entry in self.entries.iter_mut().filter(|e| e.id >= first) {
            entry.flags.valid = false;
            entry.flags.speculative = false;
        }
        self.unresolved.retain(|id| *id < first);
    }

    /// Removes every entry that is ready to be removed, returning their ids.
    pub fn purge_removable(&mut self) -> Vec<InstrId> {
        let mut removed = Vec::new();
        self.entries.retain(|e| {
            let remove = e.is_ready_to_be_removed();
            if remove {
                removed.push(e.id);
            }
            !remove
        });
        removed
    }

    /// Returns true if the head may commit this cycle.
    pub fn can_commit(&self) -> bool {
        self.entries
            .front()
            .is_some_and(RobEntry::is_ready_to_be_committed)
    }

    /// Removes and returns the head.
    ///
    /// Committing from an empty ROB, or a head that is busy, speculative or
    /// invalid, is a pipeline bug.
    pub fn commit_head(&mut self) -> InstrId {
        let Some(head) = self.entries.front() else {
            panic!("commit from an empty ROB");
        };
        assert!(
            head.is_ready_to_be_committed(),
            "commit of ROB head {} with flags {:?}",
            head.id,
            head.flags
        );
        let id = head.id;
        let _ = self.entries.pop_front();
        id
    }

    /// The oldest entry.
    pub fn head(&self) -> Option<&RobEntry> {
        self.entries.front()
    }

    /// Entry tracking `id`.
    pub fn entry(&self, id: InstrId) -> Option<&RobEntry> {
        // Entries are sorted by id.
        self.entries
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.entries[i])
    }

    fn entry_mut(&mut self, id: InstrId) -> Option<&mut RobEntry> {
        self.entries
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &mut self.entries[i])
    }

    /// Returns true if `id` is tracked and speculative.
    pub fn is_speculative(&self, id: InstrId) -> bool {
        self.entry(id).is_some_and(|e| e.flags.speculative)
    }

    /// Entries from head to tail.
    pub fn entries(&self) -> impl Iterator<Item = &RobEntry> {
        self.entries.iter()
    }
}
