//! Fetch.
//!
//! Reads up to `width` descriptors starting at `pc`. Every control
//! instruction is predicted and its direction shifted into the global
//! history immediately; a predicted-taken instruction ends the group and
//! redirects the next fetch.

use super::instruction::{BranchPrediction, FetchedInstruction};
use crate::core::units::bru::BranchPredictor;
use crate::isa::{INSTRUCTION_BYTES, Program};

/// One cycle's worth of fetched instructions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchGroup {
    /// Fetched instructions in program order.
    pub instructions: Vec<FetchedInstruction>,
    /// Address to fetch from next cycle.
    pub next_pc: u64,
}

/// Fetches a group from `program` at `pc`.
pub fn fetch_group<P: BranchPredictor>(
    program: &Program,
    pc: u64,
    width: usize,
    predictor: &mut P,
) -> FetchGroup {
    let mut instructions = Vec::with_capacity(width);
    let mut pc = pc;
    while instructions.len() < width {
        let Some(descriptor) = program.fetch(pc) else {
            break;
        };
        let op = descriptor.op();
        let prediction = op.is_control().then(|| {
            let history = predictor.history();
            let p = predictor.predict(pc, op.is_unconditional());
            predictor.speculate(p.taken);
            BranchPrediction {
                taken: p.taken,
                target: p.target,
                history,
            }
        });
        instructions.push(FetchedInstruction {
            pc,
            descriptor: descriptor.clone(),
            prediction,
        });
        if let Some(BranchPrediction {
            taken: true,
            target,
            ..
        }) = prediction
        {
            pc = target;
            break;
        }
        pc += INSTRUCTION_BYTES;
    }
    FetchGroup {
        instructions,
        next_pc: pc,
    }
}
