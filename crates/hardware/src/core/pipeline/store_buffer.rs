//! Store Buffer.
//!
//! Holds in-flight stores in program order. Provides:
//! 1. **Ordering:** Store selection stalls behind any store whose address is
//!    unknown, and never reorders two stores to the same word.
//! 2. **Forwarding:** Younger loads may take their value from a matching
//!    store still resident here.
//! 3. **Commit:** Memory is written when the head store commits.

use crate::common::ids::{InstrId, RegisterId};
use crate::core::arch::RegisterFile;
use crate::isa::AccessWidth;
use serde::Serialize;
use std::collections::VecDeque;

/// Masks an address down to its 4-byte word.
pub const fn word_of(address: u64) -> u64 {
    address & !3
}

/// Returns true if two accesses touch a common 4-byte word.
pub const fn words_overlap(a: u64, a_bytes: u8, b: u64, b_bytes: u8) -> bool {
    let a_last = word_of(a.saturating_add(a_bytes.saturating_sub(1) as u64));
    let b_last = word_of(b.saturating_add(b_bytes.saturating_sub(1) as u64));
    word_of(a) <= b_last && word_of(b) <= a_last
}

/// An in-flight store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StoreItem {
    /// Store instruction.
    pub id: InstrId,
    /// Effective address, `None` until computed.
    pub address: Option<u64>,
    /// Access size in bytes.
    pub bytes: u8,
    /// Register holding the value to store.
    pub source: RegisterId,
    /// Whether `source` holds its value.
    pub source_ready: bool,
    /// Memory-access unit currently serving the store.
    pub unit: Option<usize>,
    /// Set once the memory-access stage finished.
    pub accessed: bool,
}

impl StoreItem {
    /// Address as shown to users, `-1` while unknown.
    pub fn address_or_unknown(&self) -> i64 {
        self.address.map_or(-1, |a| a as i64)
    }

    /// Returns true while a memory-access unit holds the store.
    pub const fn is_accessing(&self) -> bool {
        self.unit.is_some()
    }
}

/// Result of searching the store buffer on behalf of a load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForwardResult {
    /// The youngest older store to the same address supplies the value.
    Hit {
        /// Forwarding store.
        store: InstrId,
        /// Register holding the stored value.
        source: RegisterId,
    },
    /// No older store matches; the load may read memory.
    Miss,
    /// A matching store exists but cannot forward yet.
    Stall,
}

/// Program-ordered queue of stores.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoreBuffer {
    items: VecDeque<StoreItem>,
    capacity: usize,
}

impl StoreBuffer {
    /// Creates an empty buffer.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns true when no store can be allocated.
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Returns true if no store is buffered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of buffered stores.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Appends a store at dispatch.
    pub fn allocate(&mut self, id: InstrId, source: RegisterId, width: AccessWidth) {
        assert!(!self.is_full(), "allocation in a full store buffer");
        self.items.push_back(StoreItem {
            id,
            address: None,
            bytes: width.bytes,
            source,
            source_ready: false,
            unit: None,
            accessed: false,
        });
    }

    /// Records the computed address of `id`.
    pub fn set_address(&mut self, id: InstrId, address: u64) {
        if let Some(item) = self.item_mut(id) {
            item.address = Some(address);
        }
    }

    /// Refreshes every store's source readiness from the register file.
    pub fn update_readiness(&mut self, regs: &RegisterFile) {
        for item in &mut self.items {
            item.source_ready = regs.is_ready(item.source);
        }
    }

    /// Picks the store to send to memory this cycle.
    ///
    /// Scanning stops at the first store with an unknown address. The first
    /// eligible store (address known, value ready, not speculative, not yet
    /// accessed) is chosen unless an older store touches one of its words.
    pub fn select_for_memory(&self, speculative: impl Fn(InstrId) -> bool) -> Option<InstrId> {
        for (index, item) in self.items.iter().enumerate() {
            let Some(address) = item.address else {
                return None;
            };
            if item.is_accessing() || item.accessed || !item.source_ready || speculative(item.id)
            {
                continue;
            }
            let collides = self
                .items
                .range(..index)
                .any(|older| {
                    older
                        .address
                        .is_some_and(|a| words_overlap(a, older.bytes, address, item.bytes))
                });
            return (!collides).then_some(item.id);
        }
        None
    }

    /// Marks `id` as occupying memory-access unit `unit`.
    pub fn begin_access(&mut self, id: InstrId, unit: usize) {
        if let Some(item) = self.item_mut(id) {
            item.unit = Some(unit);
        }
    }

    /// Marks the memory access of `id` as finished.
    pub fn finish_access(&mut self, id: InstrId) {
        if let Some(item) = self.item_mut(id) {
            item.unit = None;
            item.accessed = true;
        }
    }

    /// Searches older stores for a value a load at `address` may take.
    ///
    /// Stores are walked youngest first. Any shared word is a match. A match
    /// forwards only if the
    /// store covers the load exactly, its value is ready and no store with
    /// an unknown address sits between it and the load; otherwise the load
    /// stalls.
    pub fn forward_for_load(&self, load: InstrId, address: u64, bytes: u8) -> ForwardResult {
        let mut unresolved_between = false;
        for item in self.items.iter().rev().filter(|s| s.id < load) {
            let Some(store_address) = item.address else {
                unresolved_between = true;
                continue;
            };
            if !words_overlap(store_address, item.bytes, address, bytes) {
                continue;
            }
            let covers = store_address == address && item.bytes >= bytes;
            return if covers && item.source_ready && !unresolved_between {
                ForwardResult::Hit {
                    store: item.id,
                    source: item.source,
                }
            } else {
                ForwardResult::Stall
            };
        }
        ForwardResult::Miss
    }

    /// Pops the head store at commit.
    ///
    /// Releasing an empty buffer is a pipeline bug.
    pub fn release_first(&mut self) -> StoreItem {
        let Some(item) = self.items.pop_front() else {
            panic!("release_first on an empty store buffer");
        };
        item
    }

    /// Drops every store matching `squashed`.
    pub fn purge(&mut self, squashed: impl Fn(InstrId) -> bool) {
        self.items.retain(|item| !squashed(item.id));
    }

    /// Store tracked for `id`.
    pub fn item(&self, id: InstrId) -> Option<&StoreItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn item_mut(&mut self, id: InstrId) -> Option<&mut StoreItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Buffered stores, oldest first.
    pub fn items(&self) -> impl Iterator<Item = &StoreItem> {
        self.items.iter()
    }
}
