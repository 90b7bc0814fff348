//! Issue, execution and branch resolution.

use super::CpuState;
use crate::common::ids::InstrId;
use crate::config::UnitClass;
use crate::core::arch::Readiness;
use crate::core::pipeline::BranchOutcome;
use crate::core::units::bru::BranchPredictor;
use crate::isa::{INSTRUCTION_BYTES, Outcome};

impl CpuState {
    /// Sends ready instructions from every issue window to idle units.
    ///
    /// Windows are visited in [`UnitClass::ISSUED`] order, each scanning
    /// oldest first.
    pub(super) fn issue_stage(&mut self) {
        for window in &mut self.windows {
            let instructions = &self.instructions;
            let registers = &self.registers;
            let issued = window.select(&mut self.units, |id| {
                let ins = instructions.get(&id)?;
                // A store computes its address from the base alone; the
                // store buffer waits for the value.
                let skip = usize::from(ins.op().is_store());
                ins.sources
                    .iter()
                    .skip(skip)
                    .all(|s| registers.is_ready(*s))
                    .then(|| ins.op().operation())
            });
            for (id, unit) in issued {
                if let Some(ins) = self.instructions.get_mut(&id) {
                    ins.function_unit_cycle = Some(self.cycle);
                }
                tracing::debug!(
                    cycle = self.cycle,
                    %id,
                    unit = %self.units.units()[unit].config.name,
                    "issued"
                );
            }
        }
    }

    /// Advances the issued-class units and applies every completion.
    ///
    /// Completions are handled oldest first, so a mispredicted branch
    /// squashes younger completions of the same cycle before they apply.
    pub(super) fn execute_stage(&mut self) {
        for done in self.units.tick(&UnitClass::ISSUED) {
            let Some(ins) = self.instructions.get(&done.id) else {
                continue;
            };
            let op = ins.op();
            let values: Vec<u64> = ins
                .sources
                .iter()
                .map(|s| self.registers.value(*s))
                .collect();
            let outcome = op.evaluate(
                &values,
                ins.descriptor.immediate(),
                ins.descriptor.label_address(),
                ins.pc,
            );
            match outcome {
                Outcome::Value(value) => self.broadcast(done.id, value),
                Outcome::Address(address) if op.is_load() => {
                    self.load_address_ready(done.id, address);
                }
                Outcome::Address(address) => self.store_address_ready(done.id, address),
                Outcome::Branch {
                    taken,
                    target,
                    link,
                } => self.resolve_branch(done.id, taken, target, link),
            }
        }
    }

    /// Writes a result to the destination tag and clears the ROB busy flag.
    pub(super) fn broadcast(&mut self, id: InstrId, value: u64) {
        let Some(ins) = self.instructions.get_mut(&id) else {
            return;
        };
        ins.ready_cycle = Some(self.cycle);
        if let Some(dest) = ins.destination {
            self.registers.write(dest, value);
            self.registers.set_readiness(dest, Readiness::Executed);
        }
        self.rob.mark_executed(id);
        tracing::debug!(cycle = self.cycle, %id, value, "result broadcast");
    }

    /// Checks a resolved branch against its prediction, trains the
    /// predictor and squashes the wrong path.
    fn resolve_branch(&mut self, id: InstrId, taken: bool, target: u64, link: Option<u64>) {
        let Some(ins) = self.instructions.get_mut(&id) else {
            return;
        };
        let Some(prediction) = ins.prediction else {
            panic!("branch {id} reached execution without a prediction");
        };
        let pc = ins.pc;
        let fall_through = pc + INSTRUCTION_BYTES;
        let actual_next = if taken { target } else { fall_through };
        let predicted_next = if prediction.taken {
            prediction.target
        } else {
            fall_through
        };
        let mispredicted = actual_next != predicted_next;
        ins.outcome = Some(BranchOutcome {
            taken,
            target_offset: target as i64 - pc as i64,
            mispredicted,
        });

        self.broadcast(id, link.unwrap_or_default());
        self.predictor.update(pc, prediction.history, taken, target);
        self.stats.branches_resolved += 1;

        if mispredicted {
            self.stats.branch_mispredictions += 1;
            tracing::debug!(cycle = self.cycle, %id, taken, target = actual_next, "mispredicted");
            self.squash_from(id.next(), actual_next);
            self.predictor.restore_history(prediction.history);
            self.predictor.speculate(taken);
        }
        self.rob.resolve_branch(id);
    }
}
