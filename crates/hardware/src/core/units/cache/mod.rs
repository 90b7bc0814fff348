//! Set-Associative Data Cache.
//!
//! Models hits, misses and dirty write-backs of a write-allocate,
//! write-back cache in front of the memory controller. Only tags are kept;
//! data always lives in the backing memory. The cache is plain data and is
//! snapshotted with the rest of the core, so stepping back also restores
//! line contents and replacement state.

/// Cache replacement policies (FIFO, LRU).
pub mod policies;

use self::policies::{Policy, ReplacementPolicy};
use crate::config::CacheConfig;
use serde::Serialize;

/// Cache line entry containing tag, validity, and dirty bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
struct CacheLine {
    tag: u64,
    valid: bool,
    dirty: bool,
}

/// Outcome of one line access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lookup {
    /// Whether the line was resident.
    pub hit: bool,
    /// Base address of a dirty line evicted to make room.
    pub written_back: Option<u64>,
}

/// Tag store of a set-associative cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Cache {
    /// Cycles for a hit.
    pub latency: u32,
    /// Line accesses that hit.
    pub hits: u64,
    /// Line accesses that missed.
    pub misses: u64,
    /// Dirty lines written back on eviction.
    pub writebacks: u64,
    lines: Vec<CacheLine>,
    sets: usize,
    ways: usize,
    line_bytes: usize,
    policy: Policy,
}

impl Cache {
    /// Builds the cache described by `config`.
    ///
    /// Returns `None` when the cache is disabled or its geometry does not
    /// divide into whole sets.
    pub fn new(config: &CacheConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let sets = config.sets()?;
        Some(Self {
            latency: config.latency,
            hits: 0,
            misses: 0,
            writebacks: 0,
            lines: vec![CacheLine::default(); sets * config.ways],
            sets,
            ways: config.ways,
            line_bytes: config.line_bytes,
            policy: Policy::new(config.policy, sets, config.ways),
        })
    }

    /// Line size in bytes.
    pub const fn line_bytes(&self) -> u64 {
        self.line_bytes as u64
    }

    /// Base addresses of the lines an access of `bytes` at `address` touches.
    pub fn lines_touched(&self, address: u64, bytes: u8) -> impl Iterator<Item = u64> + use<> {
        let line = self.line_bytes();
        let last = address.saturating_add(u64::from(bytes.max(1)) - 1);
        (address / line..=last / line).map(move |n| n * line)
    }

    fn locate(&self, address: u64) -> (usize, u64) {
        let line = address / self.line_bytes();
        ((line % self.sets as u64) as usize, line / self.sets as u64)
    }

    fn way_of(&self, set: usize, tag: u64) -> Option<usize> {
        self.lines[set * self.ways..(set + 1) * self.ways]
            .iter()
            .position(|l| l.valid && l.tag == tag)
    }

    /// Returns true if the line holding `address` is resident.
    pub fn contains(&self, address: u64) -> bool {
        let (set, tag) = self.locate(address);
        self.way_of(set, tag).is_some()
    }

    /// Accesses the line holding `address`, filling it on a miss.
    pub fn access(&mut self, address: u64, is_write: bool) -> Lookup {
        let (set, tag) = self.locate(address);
        if let Some(way) = self.way_of(set, tag) {
            self.hits += 1;
            self.policy.touch(set, way);
            if is_write {
                self.lines[set * self.ways + way].dirty = true;
            }
            return Lookup {
                hit: true,
                written_back: None,
            };
        }

        self.misses += 1;
        let (sets, line_bytes) = (self.sets as u64, self.line_bytes());
        let way = self.policy.victim(set);
        let slot = &mut self.lines[set * self.ways + way];
        let written_back =
            (slot.valid && slot.dirty).then(|| (slot.tag * sets + set as u64) * line_bytes);
        *slot = CacheLine {
            tag,
            valid: true,
            dirty: is_write,
        };
        self.policy.fill(set, way);
        if let Some(victim) = written_back {
            self.writebacks += 1;
            tracing::trace!(victim, set, way, "dirty line written back");
        }
        Lookup {
            hit: false,
            written_back,
        }
    }
}
