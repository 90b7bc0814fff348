//! Load/store path: address results, memory-access selection, forwarding
//! and late hazard detection.

use super::CpuState;
use crate::common::ids::{InstrId, RegisterId};
use crate::config::{Operation, UnitClass};
use crate::core::pipeline::{ForwardResult, LoadItem};
use crate::core::units::memory::{MemoryModel, extend};

impl CpuState {
    /// Advances memory-access units and applies finished accesses.
    pub(super) fn memory_complete_stage(&mut self) {
        for done in self.units.tick(&[UnitClass::Memory]) {
            if let Some(load) = self.loads.item(done.id).copied() {
                let value = extend(done.data.unwrap_or_default(), load.bytes, load.signed);
                self.loads.finish_access(done.id);
                self.broadcast(done.id, value);
            } else if self.stores.item(done.id).is_some() {
                self.stores.finish_access(done.id);
                self.rob.mark_executed(done.id);
                tracing::debug!(cycle = self.cycle, id = %done.id, "store access finished");
            }
        }
    }

    /// Starts at most one store and as many loads as there are idle
    /// memory-access units.
    pub(super) fn memory_issue_stage(&mut self) {
        self.stores.update_readiness(&self.registers);

        let rob = &self.rob;
        if let Some(id) = self.stores.select_for_memory(|id| rob.is_speculative(id))
            && let Some(unit) = self.units.first_idle(UnitClass::Memory, Operation::Memory)
            && let Some((address, bytes)) = self
                .stores
                .item(id)
                .and_then(|s| s.address.map(|a| (a, s.bytes)))
        {
            let access = self.memory.store_access(address, bytes, self.cycle);
            self.stats.record_cache(access.hit);
            self.units.start(unit, id, access.latency, None);
            self.stores.begin_access(id, unit);
            tracing::debug!(cycle = self.cycle, %id, address, "store sent to memory");
        }

        for load in self.loads.pending() {
            let Some(address) = load.address else {
                continue;
            };
            match self.stores.forward_for_load(load.id, address, load.bytes) {
                ForwardResult::Hit { store, source } => self.forward(load, store, source),
                ForwardResult::Stall => {}
                ForwardResult::Miss => {
                    let Some(unit) = self.units.first_idle(UnitClass::Memory, Operation::Memory)
                    else {
                        break;
                    };
                    let access = self.memory.load(address, load.bytes, self.cycle);
                    self.stats.memory_reads += 1;
                    self.stats.record_cache(access.hit);
                    self.units
                        .start(unit, load.id, access.latency, Some(access.data));
                    self.loads.begin_access(load.id, unit);
                    tracing::debug!(cycle = self.cycle, id = %load.id, address, "load sent to memory");
                }
            }
        }
    }

    /// Records a load's address and forwards from the store buffer at once
    /// when possible, skipping the memory-access stage.
    pub(super) fn load_address_ready(&mut self, id: InstrId, address: u64) {
        self.loads.set_address(id, address);
        self.stores.update_readiness(&self.registers);
        let Some(load) = self.loads.item(id).copied() else {
            return;
        };
        if let ForwardResult::Hit { store, source } =
            self.stores.forward_for_load(id, address, load.bytes)
        {
            self.forward(load, store, source);
        }
    }

    /// Records a store's address and squashes any younger load sharing a
    /// word with it that already obtained a stale value.
    pub(super) fn store_address_ready(&mut self, id: InstrId, address: u64) {
        self.stores.set_address(id, address);
        let Some(bytes) = self.stores.item(id).map(|s| s.bytes) else {
            return;
        };
        let Some(load) = self.loads.conflicting_load(id, address, bytes) else {
            return;
        };
        let Some(pc) = self.instructions.get(&load).map(|i| i.pc) else {
            return;
        };
        self.stats.memory_hazards += 1;
        tracing::debug!(cycle = self.cycle, store = %id, %load, address, "late memory hazard");
        self.squash_from(load, pc);
    }

    fn forward(&mut self, load: LoadItem, store: InstrId, source: RegisterId) {
        let value = extend(self.registers.value(source), load.bytes, load.signed);
        self.loads.forwarded(load.id, store);
        self.stats.loads_forwarded += 1;
        tracing::debug!(cycle = self.cycle, load = %load.id, %store, "store forwarded to load");
        self.broadcast(load.id, value);
    }
}
