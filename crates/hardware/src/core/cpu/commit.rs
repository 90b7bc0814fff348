//! In-order retirement and wrong-path squashing.

use super::CpuState;
use crate::common::ids::InstrId;
use crate::core::arch::Readiness;
use crate::core::units::bru::BranchPredictor;
use crate::core::units::memory::MemoryModel;

impl CpuState {
    /// Retires up to `commit_width` instructions from the ROB head.
    ///
    /// Stores write memory here and nowhere else. A committed destination
    /// tag is copied into its architectural register and stays Assigned
    /// while younger readers still reference it.
    pub(super) fn commit_stage(&mut self) {
        for _ in 0..self.config.pipeline.commit_width {
            if !self.rob.can_commit() {
                break;
            }
            let id = self.rob.commit_head();
            let Some(ins) = self.instructions.remove(&id) else {
                panic!("committed {id} is missing from the instruction arena");
            };
            let op = ins.op();
            let code = ins.renamed_code(&self.registers);

            if op.is_store() {
                let item = self.stores.release_first();
                assert_eq!(item.id, id, "store buffer head out of step with the ROB");
                let Some(address) = item.address else {
                    panic!("store {id} committed without an address");
                };
                let data = self.registers.value(item.source);
                self.memory.store(address, data, item.bytes, self.cycle);
                self.stats.memory_writes += 1;
            } else if op.is_load() {
                let item = self.loads.release_first();
                assert_eq!(item.id, id, "load buffer head out of step with the ROB");
            }

            if let Some(dest) = ins.destination {
                self.rename.direct_copy_mapping(&mut self.registers, dest);
                if !self.rename.release(&mut self.registers, dest) {
                    self.registers.set_readiness(dest, Readiness::Assigned);
                }
            }
            for source in &ins.sources {
                let _ = self.rename.release(&mut self.registers, *source);
            }

            self.stats.record_commit(op.class(), op.is_load());
            tracing::debug!(cycle = self.cycle, %id, %code, "committed");
        }
    }

    /// Discards `first` and every younger instruction, then redirects fetch.
    ///
    /// Registers are released youngest first so that each tag's reference
    /// count drops to zero exactly when its last user is gone. Global
    /// history returns to the checkpoint of the oldest discarded control
    /// instruction.
    pub(super) fn squash_from(&mut self, first: InstrId, redirect: u64) {
        let victims: Vec<InstrId> = self.instructions.range(first..).map(|(id, _)| *id).collect();

        let checkpoint = victims
            .iter()
            .filter_map(|id| self.instructions.get(id).and_then(|i| i.prediction))
            .chain(self.fetched.iter().filter_map(|f| f.prediction))
            .map(|p| p.history)
            .next();
        if let Some(history) = checkpoint {
            self.predictor.restore_history(history);
        }

        self.rob.invalidate_from(first);
        let _ = self.rob.purge_removable();
        let squashed = |id: InstrId| id >= first;
        for window in &mut self.windows {
            window.purge(squashed);
        }
        self.units.purge(squashed);
        self.loads.purge(squashed);
        self.stores.purge(squashed);
        self.renamed.retain(|id| *id < first);
        let dropped_fetch = self.fetched.len();
        self.fetched.clear();

        for id in victims.iter().rev() {
            let Some(ins) = self.instructions.remove(id) else {
                continue;
            };
            for source in &ins.sources {
                let _ = self.rename.release(&mut self.registers, *source);
            }
            if let Some(dest) = ins.destination {
                let _ = self.rename.release(&mut self.registers, dest);
            }
        }

        self.pc = redirect;
        self.stats.flushes += 1;
        self.stats.instructions_squashed += victims.len() as u64;
        tracing::debug!(
            cycle = self.cycle,
            from = %first,
            squashed = victims.len(),
            dropped_fetch,
            redirect,
            "pipeline squashed"
        );
    }
}
