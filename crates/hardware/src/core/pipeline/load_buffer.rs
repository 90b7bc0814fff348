//! Load Buffer.
//!
//! Holds in-flight loads in program order. A load's value comes either from
//! a memory-access unit or from a store in the store buffer. Loads run
//! ahead of older stores whose address is still unknown; when such a store
//! later resolves to the same word, [`LoadBuffer::conflicting_load`] finds
//! the load that read too early.

use super::store_buffer::words_overlap;
use crate::common::ids::{InstrId, RegisterId};
use crate::isa::AccessWidth;
use serde::Serialize;
use std::collections::VecDeque;

/// An in-flight load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LoadItem {
    /// Load instruction.
    pub id: InstrId,
    /// Effective address, `None` until computed.
    pub address: Option<u64>,
    /// Access size in bytes.
    pub bytes: u8,
    /// Whether the loaded value is sign-extended.
    pub signed: bool,
    /// Destination tag.
    pub destination: RegisterId,
    /// Set once the value is in the destination.
    pub destination_ready: bool,
    /// Memory-access unit currently serving the load.
    pub unit: Option<usize>,
    /// Set once the load has read memory (or started to).
    pub read_memory: bool,
    /// Store the value was forwarded from.
    pub forwarded_from: Option<InstrId>,
}

impl LoadItem {
    /// Address as shown to users, `-1` while unknown.
    pub fn address_or_unknown(&self) -> i64 {
        self.address.map_or(-1, |a| a as i64)
    }

    /// Returns true while a memory-access unit holds the load.
    pub const fn is_accessing(&self) -> bool {
        self.unit.is_some()
    }

    /// Access width of the load.
    pub const fn width(&self) -> AccessWidth {
        AccessWidth {
            bytes: self.bytes,
            signed: self.signed,
        }
    }
}

/// Program-ordered queue of loads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoadBuffer {
    items: VecDeque<LoadItem>,
    capacity: usize,
}

impl LoadBuffer {
    /// Creates an empty buffer.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns true when no load can be allocated.
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Returns true if no load is buffered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of buffered loads.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Appends a load at dispatch.
    pub fn allocate(&mut self, id: InstrId, destination: RegisterId, width: AccessWidth) {
        assert!(!self.is_full(), "allocation in a full load buffer");
        self.items.push_back(LoadItem {
            id,
            address: None,
            bytes: width.bytes,
            signed: width.signed,
            destination,
            destination_ready: false,
            unit: None,
            read_memory: false,
            forwarded_from: None,
        });
    }

    /// Records the computed address of `id`.
    pub fn set_address(&mut self, id: InstrId, address: u64) {
        if let Some(item) = self.item_mut(id) {
            item.address = Some(address);
        }
    }

    /// Loads with a known address still waiting for their value, oldest first.
    pub fn pending(&self) -> Vec<LoadItem> {
        self.items
            .iter()
            .filter(|l| l.address.is_some() && !l.destination_ready && !l.is_accessing())
            .copied()
            .collect()
    }

    /// Marks `id` as reading memory through `unit`.
    pub fn begin_access(&mut self, id: InstrId, unit: usize) {
        if let Some(item) = self.item_mut(id) {
            item.unit = Some(unit);
            item.read_memory = true;
        }
    }

    /// Marks the memory read of `id` as finished.
    pub fn finish_access(&mut self, id: InstrId) {
        if let Some(item) = self.item_mut(id) {
            item.unit = None;
            item.destination_ready = true;
        }
    }

    /// Records that `id` took its value from `store`.
    pub fn forwarded(&mut self, id: InstrId, store: InstrId) {
        if let Some(item) = self.item_mut(id) {
            item.forwarded_from = Some(store);
            item.destination_ready = true;
        }
    }

    /// Oldest load younger than `store` that obtained a stale value for the
    /// `bytes` at `address`.
    ///
    /// A load is stale if it shares a word with the store and either read
    /// memory or forwarded from a store older than `store`.
    pub fn conflicting_load(&self, store: InstrId, address: u64, bytes: u8) -> Option<InstrId> {
        self.items
            .iter()
            .filter(|l| l.id > store)
            .filter(|l| l.address.is_some_and(|a| words_overlap(a, l.bytes, address, bytes)))
            .find(|l| l.read_memory || l.forwarded_from.is_some_and(|s| s < store))
            .map(|l| l.id)
    }

    /// Pops the head load at commit.
    ///
    /// Releasing an empty buffer is a pipeline bug.
    pub fn release_first(&mut self) -> LoadItem {
        let Some(item) = self.items.pop_front() else {
            panic!("release_first on an empty load buffer");
        };
        item
    }

    /// Drops every load matching `squashed`.
    pub fn purge(&mut self, squashed: impl Fn(InstrId) -> bool) {
        self.items.retain(|item| !squashed(item.id));
    }

    /// Load tracked for `id`.
    pub fn item(&self, id: InstrId) -> Option<&LoadItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn item_mut(&mut self, id: InstrId) -> Option<&mut LoadItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Buffered loads, oldest first.
    pub fn items(&self) -> impl Iterator<Item = &LoadItem> {
        self.items.iter()
    }
}
