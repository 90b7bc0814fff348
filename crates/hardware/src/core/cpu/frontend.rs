//! Front end: fetch, rename and dispatch.

use super::{CpuState, window_index};
use crate::core::pipeline::SimInstruction;
use crate::core::pipeline::fetch::fetch_group;

impl CpuState {
    /// Fills the fetch latch once rename has drained it.
    pub(super) fn fetch_stage(&mut self) {
        if !self.fetched.is_empty() {
            return;
        }
        let group = fetch_group(
            &self.program,
            self.pc,
            self.config.pipeline.fetch_width,
            &mut self.predictor,
        );
        self.stats.instructions_fetched += group.instructions.len() as u64;
        self.pc = group.next_pc;
        self.fetched = group.instructions;
    }

    /// Renames the fetch latch into the rename latch.
    ///
    /// Sources are looked up and referenced before the destination is
    /// mapped, so `addi x5 x5 1` reads the previous mapping of `x5`.
    /// Renaming stops, leaving the rest latched, when no tag is free.
    pub(super) fn rename_stage(&mut self) {
        if !self.renamed.is_empty() || self.fetched.is_empty() {
            return;
        }
        let mut consumed = 0;
        for fetched in &self.fetched {
            let descriptor = &fetched.descriptor;
            if descriptor.destination().is_some() && !self.rename.has_free_registers() {
                self.stats.stalls_rename += 1;
                break;
            }
            let id = self.next_id;
            self.next_id = id.next();

            let mut sources = Vec::new();
            for name in descriptor.sources() {
                let Some(arch) = self.registers.resolve(name) else {
                    panic!("unvalidated register {name} reached rename");
                };
                let reg = self.rename.mapping_for(&self.registers, arch);
                self.rename.increase_reference(&mut self.registers, reg);
                sources.push(reg);
            }
            let destination = descriptor.destination().map(|name| {
                let Some(arch) = self.registers.resolve(name) else {
                    panic!("unvalidated register {name} reached rename");
                };
                self.rename.map_register(&mut self.registers, arch, id)
            });

            let ins = SimInstruction {
                id,
                pc: fetched.pc,
                descriptor: descriptor.clone(),
                destination,
                sources,
                issue_window_cycle: None,
                function_unit_cycle: None,
                ready_cycle: None,
                prediction: fetched.prediction,
                outcome: None,
            };
            tracing::debug!(
                cycle = self.cycle,
                %id,
                code = %ins.renamed_code(&self.registers),
                "renamed"
            );
            let _ = self.instructions.insert(id, ins);
            self.renamed.push(id);
            consumed += 1;
        }
        self.stats.instructions_renamed += consumed as u64;
        let _ = self.fetched.drain(..consumed);
    }

    /// Moves renamed instructions into the ROB, their issue window and, for
    /// memory instructions, the load or store buffer.
    ///
    /// Dispatch is in order and stops at the first instruction lacking a ROB
    /// or buffer slot.
    pub(super) fn dispatch_stage(&mut self) {
        let mut dispatched = 0;
        for &id in &self.renamed {
            let Some(ins) = self.instructions.get_mut(&id) else {
                panic!("renamed instruction {id} missing from the arena");
            };
            let op = ins.op();
            if self.rob.is_full() {
                self.stats.stalls_rob += 1;
                break;
            }
            if (op.is_load() && self.loads.is_full()) || (op.is_store() && self.stores.is_full()) {
                self.stats.stalls_buffer += 1;
                break;
            }
            let speculative = self.rob.is_speculating();
            let _ = self.rob.dispatch(id, speculative);
            if op.is_control() {
                self.rob.add_branch(id);
            }
            if let Some(width) = op.access_width() {
                if op.is_load() {
                    if let Some(dest) = ins.destination {
                        self.loads.allocate(id, dest, width);
                    }
                } else if let Some(&value) = ins.sources.first() {
                    self.stores.allocate(id, value, width);
                }
            }
            ins.issue_window_cycle = Some(self.cycle);
            self.windows[window_index(op.class())].accept(id);
            dispatched += 1;
        }
        let _ = self.renamed.drain(..dispatched);
    }
}
