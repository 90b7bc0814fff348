//! Rename Map Table.
//!
//! Maps architectural registers to speculative tags. The table owns the
//! free-tag stack and the reference counts that decide when a tag may be
//! reused. It performs the following:
//! 1. **Allocation:** `map_register` pops the lowest free tag (LIFO stack).
//! 2. **Lookup:** `mapping_for` finds the freshest tag for an architectural
//!    register by maximum program order.
//! 3. **Reference Counting:** Readers and the mapping itself each hold one
//!    reference; a tag is reclaimed only when the count drops to zero.
//! 4. **Commit Support:** `direct_copy_mapping` moves a committed value into
//!    its architectural register.

use crate::common::ids::{InstrId, RegisterId};
use crate::core::arch::{Readiness, RegisterFile};
use serde::Serialize;
use std::collections::BTreeMap;

/// A live mapping from a tag to an architectural register.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenameMapping {
    /// Architectural register the tag stands in for.
    pub architectural: RegisterId,
    /// Program-order id of the instruction that created the mapping.
    pub order: InstrId,
    /// Outstanding references, including the mapping's own.
    pub references: u32,
}

/// Tag allocation and lookup state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenameMapTable {
    /// Free tags; the top of the stack is the last element.
    free: Vec<RegisterId>,
    mappings: BTreeMap<RegisterId, RenameMapping>,
}

impl RenameMapTable {
    /// Creates a table with every tag of `regs` free, `t0` on top.
    pub fn new(regs: &RegisterFile) -> Self {
        Self {
            free: regs.tag_ids().rev().collect(),
            mappings: BTreeMap::new(),
        }
    }

    /// Returns true if at least one tag can be mapped.
    pub fn has_free_registers(&self) -> bool {
        !self.free.is_empty()
    }

    /// Number of free tags.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Maps `architectural` to a fresh tag on behalf of instruction `order`.
    ///
    /// The tag starts `Allocated` with one reference, held by the mapping.
    /// Callers must check [`has_free_registers`](Self::has_free_registers)
    /// first; running out of tags here is a pipeline bug.
    pub fn map_register(
        &mut self,
        regs: &mut RegisterFile,
        architectural: RegisterId,
        order: InstrId,
    ) -> RegisterId {
        let Some(tag) = self.free.pop() else {
            panic!("map_register called with no free speculative register");
        };
        debug_assert!(
            self.mappings
                .values()
                .all(|m| m.architectural != architectural || m.order < order),
            "rename order must increase per architectural register"
        );
        let _ = self.mappings.insert(
            tag,
            RenameMapping {
                architectural,
                order,
                references: 1,
            },
        );
        let kind = regs[architectural].kind;
        let reg = &mut regs[tag];
        reg.kind = kind;
        reg.value = 0;
        reg.readiness = Readiness::Allocated;
        reg.references = 1;
        tag
    }

    /// Adds a reader reference to `tag`. Architectural registers are ignored.
    pub fn increase_reference(&mut self, regs: &mut RegisterFile, tag: RegisterId) {
        if !regs.is_speculative(tag) {
            return;
        }
        let Some(mapping) = self.mappings.get_mut(&tag) else {
            panic!("reference to unmapped register {}", regs[tag].name);
        };
        mapping.references += 1;
        regs[tag].references += 1;
    }

    /// Drops a reference to `tag`, returning true when none remain.
    ///
    /// Architectural registers are never reclaimed, so they always return false.
    pub fn reduce_reference(&mut self, regs: &mut RegisterFile, tag: RegisterId) -> bool {
        if !regs.is_speculative(tag) {
            return false;
        }
        let Some(mapping) = self.mappings.get_mut(&tag) else {
            panic!("reference released on unmapped register {}", regs[tag].name);
        };
        assert!(
            mapping.references > 0,
            "reference count underflow on {}",
            regs[tag].name
        );
        mapping.references -= 1;
        regs[tag].references -= 1;
        mapping.references == 0
    }

    /// Removes the mapping of `tag` and returns it to the free stack.
    ///
    /// No-op for architectural registers. Freeing an unmapped tag, or one
    /// that is still referenced, is a pipeline bug.
    pub fn free_mapping(&mut self, regs: &mut RegisterFile, tag: RegisterId) {
        if !regs.is_speculative(tag) {
            return;
        }
        let Some(mapping) = self.mappings.remove(&tag) else {
            panic!("double free of register {}", regs[tag].name);
        };
        assert_eq!(
            mapping.references, 0,
            "freeing referenced register {}",
            regs[tag].name
        );
        let reg = &mut regs[tag];
        reg.readiness = Readiness::Free;
        reg.references = 0;
        self.free.push(tag);
    }

    /// Drops one reference and frees the tag if it was the last.
    ///
    /// Returns true if the tag was freed.
    pub fn release(&mut self, regs: &mut RegisterFile, tag: RegisterId) -> bool {
        let last = self.reduce_reference(regs, tag);
        if last {
            self.free_mapping(regs, tag);
        }
        last
    }

    /// Register a new reader of `architectural` must use.
    ///
    /// Constant registers resolve to themselves. Otherwise the live mapping
    /// with the highest order wins, falling back to the architectural
    /// register when none exists.
    pub fn mapping_for(&self, regs: &RegisterFile, architectural: RegisterId) -> RegisterId {
        if regs[architectural].constant {
            return architectural;
        }
        self.mappings
            .iter()
            .filter(|(_, m)| m.architectural == architectural)
            .max_by_key(|(_, m)| m.order)
            .map_or(architectural, |(tag, _)| *tag)
    }

    /// Copies a committed tag's value into its architectural register.
    pub fn direct_copy_mapping(&self, regs: &mut RegisterFile, tag: RegisterId) {
        if let Some(mapping) = self.mappings.get(&tag) {
            let value = regs.value(tag);
            regs.write(mapping.architectural, value);
        }
    }

    /// Live mapping of `tag`.
    pub fn mapping(&self, tag: RegisterId) -> Option<&RenameMapping> {
        self.mappings.get(&tag)
    }

    /// Every live mapping, keyed by tag.
    pub fn mappings(&self) -> impl Iterator<Item = (RegisterId, &RenameMapping)> {
        self.mappings.iter().map(|(tag, m)| (*tag, m))
    }

    /// Free tags, top of stack last.
    pub fn free_tags(&self) -> &[RegisterId] {
        &self.free
    }
}
