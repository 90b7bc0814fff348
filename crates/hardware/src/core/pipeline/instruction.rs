//! Dynamic instruction instances.
//!
//! A [`SimInstruction`] is created when rename takes a descriptor out of the
//! fetch latch and lives in the CPU's instruction arena until it commits or
//! is squashed. Every other structure refers to it by [`InstrId`].

use crate::common::ids::{InstrId, RegisterId};
use crate::core::arch::RegisterFile;
use crate::isa::{OpKind, Operand, StaticInstruction};
use serde::Serialize;
use std::fmt::Write;
use std::sync::Arc;

/// Fetch-time branch prediction carried with a control instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BranchPrediction {
    /// Predicted direction.
    pub taken: bool,
    /// Predicted target; meaningful only when `taken`.
    pub target: u64,
    /// Global history before this branch was shifted in.
    pub history: u64,
}

/// Resolved control flow of a branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BranchOutcome {
    /// Actual direction.
    pub taken: bool,
    /// Actual target minus the branch's own address.
    pub target_offset: i64,
    /// Whether the prediction disagreed with the outcome.
    pub mispredicted: bool,
}

/// An in-flight instruction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimInstruction {
    /// Program-order id.
    pub id: InstrId,
    /// Byte address of the instruction.
    pub pc: u64,
    /// Immutable descriptor, shared with the program.
    pub descriptor: Arc<StaticInstruction>,
    /// Renamed destination tag.
    pub destination: Option<RegisterId>,
    /// Renamed sources in operand order.
    pub sources: Vec<RegisterId>,
    /// Cycle the instruction entered its issue window.
    pub issue_window_cycle: Option<u64>,
    /// Cycle the instruction started in a functional unit.
    pub function_unit_cycle: Option<u64>,
    /// Cycle the result was broadcast.
    pub ready_cycle: Option<u64>,
    /// Fetch-time prediction, for control instructions.
    pub prediction: Option<BranchPrediction>,
    /// Resolution, once the branch unit has run.
    pub outcome: Option<BranchOutcome>,
}

impl SimInstruction {
    /// Operation kind.
    pub fn op(&self) -> OpKind {
        self.descriptor.op()
    }

    /// Renders the instruction with renamed registers, e.g. `add t0 x2 x3`.
    pub fn renamed_code(&self, regs: &RegisterFile) -> String {
        let mut line = self.op().mnemonic().to_string();
        let mut sources = self.sources.iter();
        for operand in self.descriptor.operands() {
            let renamed = match operand {
                Operand::Destination(_) => self.destination.map(|d| regs[d].name.as_str()),
                Operand::Source(name) => sources
                    .next()
                    .map(|s| regs[*s].name.as_str())
                    .or(Some(name.as_str())),
                _ => None,
            };
            let _ = match (renamed, operand) {
                (Some(name), _) => write!(line, " {name}"),
                (None, operand) => write!(line, " {operand}"),
            };
        }
        line
    }
}

/// An entry of the fetch latch, waiting for rename.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FetchedInstruction {
    /// Byte address.
    pub pc: u64,
    /// Descriptor at `pc`.
    pub descriptor: Arc<StaticInstruction>,
    /// Prediction for control instructions.
    pub prediction: Option<BranchPrediction>,
}
