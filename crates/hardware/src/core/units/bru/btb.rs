//! Branch Target Buffer (BTB).
//!
//! The BTB is a direct-mapped table of target addresses. Fetch consults it
//! to redirect before the branch executes; an entry is written whenever a
//! branch resolves taken.

use serde::Serialize;

/// An entry in the Branch Target Buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BtbEntry {
    /// Full pc of the branch that wrote the entry.
    pub tag: u64,
    /// Target address.
    pub target: u64,
    /// Set once written.
    pub valid: bool,
}

/// Branch Target Buffer structure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Btb {
    table: Vec<BtbEntry>,
}

impl Btb {
    /// Creates an empty BTB with `size` entries (a power of two).
    pub fn new(size: usize) -> Self {
        debug_assert!(size.is_power_of_two());
        Self {
            table: vec![BtbEntry::default(); size],
        }
    }

    fn index(&self, pc: u64) -> usize {
        ((pc >> 2) as usize) & (self.table.len() - 1)
    }

    /// Target recorded for `pc`, if the entry at its index belongs to it.
    pub fn lookup(&self, pc: u64) -> Option<u64> {
        let e = self.table[self.index(pc)];
        (e.valid && e.tag == pc).then_some(e.target)
    }

    /// Records `target` for `pc`, replacing whatever shared the index.
    pub fn update(&mut self, pc: u64, target: u64) {
        let idx = self.index(pc);
        self.table[idx] = BtbEntry {
            tag: pc,
            target,
            valid: true,
        };
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true for a zero-sized BTB.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
