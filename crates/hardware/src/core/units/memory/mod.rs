//! Data memory model.
//!
//! The core talks to memory through [`MemoryModel`]: loads return their
//! data together with the access latency, and stores are written at commit.
//! [`SimulatedMemory`] keeps only the bytes ever written, behind an `Arc`,
//! so cycle snapshots share memory until a store actually changes it. An
//! optional data cache sits in front of the latency model: hits cost the
//! cache latency, misses add the controller's latency for the fill and for
//! any dirty line written back.

/// Latency models.
pub mod controller;

pub use controller::LatencyModel;

use crate::config::MemoryConfig;
use crate::core::units::cache::Cache;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Result of a timed memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryAccess {
    /// Cycles the access takes.
    pub latency: u32,
    /// Little-endian value read, zero-extended. Zero for stores.
    pub data: u64,
    /// Whether every line touched was cached, `None` without a cache.
    pub hit: Option<bool>,
}

/// Interface between the load/store path and the memory system.
pub trait MemoryModel {
    /// Reads `bytes` bytes at `address`.
    fn load(&mut self, address: u64, bytes: u8, cycle: u64) -> MemoryAccess;

    /// Timing of the memory-access stage of a `bytes`-wide store to
    /// `address` issued at `cycle`. Memory is not written.
    fn store_access(&mut self, address: u64, bytes: u8, cycle: u64) -> MemoryAccess;

    /// Writes the low `bytes` bytes of `data` at `address`.
    fn store(&mut self, address: u64, data: u64, bytes: u8, cycle: u64);

    /// Reads without timing side effects.
    fn peek(&self, address: u64, bytes: u8) -> u64;
}

/// Sparse byte-addressed little-endian memory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SimulatedMemory {
    bytes: Arc<BTreeMap<u64, u8>>,
    latency: LatencyModel,
    /// Data cache, when enabled.
    pub cache: Option<Cache>,
    /// Loads served.
    pub loads: u64,
    /// Stores written.
    pub stores: u64,
}

impl SimulatedMemory {
    /// Creates an empty memory.
    pub fn new(config: &MemoryConfig) -> Self {
        Self {
            bytes: Arc::new(BTreeMap::new()),
            latency: LatencyModel::new(config),
            cache: Cache::new(&config.cache),
            loads: 0,
            stores: 0,
        }
    }

    /// Number of bytes ever written.
    pub fn written_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if this memory and `other` share storage.
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }

    /// Latency of an access through the cache, if any, and whether it hit.
    fn timed(&mut self, address: u64, bytes: u8, is_store: bool) -> (u32, Option<bool>) {
        let Some(cache) = self.cache.as_mut() else {
            return (self.latency.access_latency(address, is_store), None);
        };
        let mut latency = cache.latency;
        let mut hit = true;
        for line in cache.lines_touched(address, bytes) {
            let lookup = cache.access(line, is_store);
            if let Some(victim) = lookup.written_back {
                latency = latency.saturating_add(self.latency.access_latency(victim, true));
            }
            if !lookup.hit {
                hit = false;
                latency = latency.saturating_add(self.latency.access_latency(line, false));
            }
        }
        (latency, Some(hit))
    }
}

impl MemoryModel for SimulatedMemory {
    fn load(&mut self, address: u64, bytes: u8, _cycle: u64) -> MemoryAccess {
        self.loads += 1;
        let (latency, hit) = self.timed(address, bytes, false);
        MemoryAccess {
            latency,
            data: self.peek(address, bytes),
            hit,
        }
    }

    fn store_access(&mut self, address: u64, bytes: u8, _cycle: u64) -> MemoryAccess {
        let (latency, hit) = self.timed(address, bytes, true);
        MemoryAccess {
            latency,
            data: 0,
            hit,
        }
    }

    fn store(&mut self, address: u64, data: u64, bytes: u8, _cycle: u64) {
        self.stores += 1;
        let map = Arc::make_mut(&mut self.bytes);
        for (i, byte) in data.to_le_bytes().into_iter().take(bytes as usize).enumerate() {
            let _ = map.insert(address.wrapping_add(i as u64), byte);
        }
    }

    fn peek(&self, address: u64, bytes: u8) -> u64 {
        let mut le = [0u8; 8];
        for (i, slot) in le.iter_mut().take(bytes as usize).enumerate() {
            *slot = self
                .bytes
                .get(&address.wrapping_add(i as u64))
                .copied()
                .unwrap_or(0);
        }
        u64::from_le_bytes(le)
    }
}

/// Sign- or zero-extends the low `bytes` bytes of `value`.
pub const fn extend(value: u64, bytes: u8, signed: bool) -> u64 {
    if bytes >= 8 {
        return value;
    }
    let shift = 64 - 8 * bytes as u32;
    if signed {
        (((value << shift) as i64) >> shift) as u64
    } else {
        (value << shift) >> shift
    }
}
