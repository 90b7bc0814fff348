//! CPU state and the per-cycle step.
//!
//! [`CpuState`] is the one owned aggregate holding every piece of mutable
//! simulator state. It is `Clone + PartialEq`, which is all the backward
//! stepping machinery needs: a snapshot is a clone, and a restore is an
//! assignment. Immutable parts (the program, the configuration, functional
//! unit descriptions, instruction descriptors) sit behind `Arc`s, and memory
//! is copy-on-write, so a clone copies only what changes cycle to cycle.
//!
//! The stage implementations are split by concern:
//! 1. **Front end** (`frontend.rs`): fetch, rename, dispatch.
//! 2. **Execution** (`execution.rs`): issue, completion, branch resolution.
//! 3. **Memory** (`memory.rs`): store/load selection, forwarding, hazards.
//! 4. **Retirement** (`commit.rs`): in-order commit and squash.

mod commit;
mod execution;
mod frontend;
mod memory;

use crate::common::error::{Result, SimError};
use crate::common::ids::InstrId;
use crate::config::{Config, Operation, UnitClass};
use crate::core::arch::{Register, RegisterFile};
use crate::core::pipeline::{
    FetchedInstruction, FunctionUnitPool, IssueWindow, LoadBuffer, RenameMapTable, ReorderBuffer,
    SimInstruction, StoreBuffer,
};
use crate::core::units::bru::BranchPredictorWrapper;
use crate::core::units::memory::{MemoryModel, SimulatedMemory};
use crate::isa::Program;
use crate::stats::SimStats;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Complete mutable state of the simulated core.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CpuState {
    #[serde(skip)]
    program: Arc<Program>,
    #[serde(skip)]
    config: Arc<Config>,

    /// Cycles completed.
    pub cycle: u64,
    /// Next fetch address.
    pub pc: u64,
    /// Architectural registers and speculative tags.
    pub registers: RegisterFile,
    /// Rename map table.
    pub rename: RenameMapTable,
    /// Reorder buffer.
    pub rob: ReorderBuffer,
    /// Issue windows, in [`UnitClass::ISSUED`] order.
    pub windows: Vec<IssueWindow>,
    /// Functional and memory-access units.
    pub units: FunctionUnitPool,
    /// Load buffer.
    pub loads: LoadBuffer,
    /// Store buffer.
    pub stores: StoreBuffer,
    /// Branch predictor.
    pub predictor: BranchPredictorWrapper,
    /// Data memory.
    pub memory: SimulatedMemory,
    /// Fetch latch: fetched, waiting for rename.
    pub fetched: Vec<FetchedInstruction>,
    /// Rename latch: renamed, waiting for dispatch.
    pub renamed: Vec<InstrId>,
    /// In-flight instruction arena.
    pub instructions: BTreeMap<InstrId, SimInstruction>,
    /// Id handed to the next renamed instruction.
    pub next_id: InstrId,
    /// Statistics.
    pub stats: SimStats,
}

impl CpuState {
    /// Builds the cycle-0 state for `program` under `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] for an unusable configuration or
    /// one with no unit able to execute some instruction of `program`, and
    /// [`SimError::UnknownRegister`] for a register name that neither the
    /// program nor the initial values may use.
    pub fn new(config: Config, program: Program) -> Result<Self> {
        config.validate()?;
        let registers = RegisterFile::with_initial_values(
            config.pipeline.speculative_registers,
            &config.registers,
        )?;
        for ins in program.instructions() {
            for name in ins.destination().into_iter().chain(ins.sources()) {
                if registers.resolve(name).is_none_or(|id| registers.is_speculative(id)) {
                    return Err(SimError::UnknownRegister(name.to_string()));
                }
            }
            let op = ins.op();
            let executable = config.has_unit_for(op.class(), op.operation())
                && (op.class() != UnitClass::LoadStore
                    || config.has_unit_for(UnitClass::Memory, Operation::Memory));
            if !executable {
                return Err(SimError::InvalidConfig(format!(
                    "no {:?} unit supports `{}`",
                    op.class(),
                    op.mnemonic()
                )));
            }
        }
        let p = &config.pipeline;
        Ok(Self {
            rename: RenameMapTable::new(&registers),
            rob: ReorderBuffer::new(p.rob_size),
            windows: UnitClass::ISSUED.iter().map(|c| IssueWindow::new(*c)).collect(),
            units: FunctionUnitPool::new(&config.function_units),
            loads: LoadBuffer::new(p.load_buffer_size),
            stores: StoreBuffer::new(p.store_buffer_size),
            predictor: BranchPredictorWrapper::new(&config.predictor),
            memory: SimulatedMemory::new(&config.memory),
            registers,
            cycle: 0,
            pc: 0,
            fetched: Vec::new(),
            renamed: Vec::new(),
            instructions: BTreeMap::new(),
            next_id: InstrId(0),
            stats: SimStats::default(),
            program: Arc::new(program),
            config: Arc::new(config),
        })
    }

    /// Advances the core by one cycle.
    ///
    /// Stages run back to front so that each latch is drained before the
    /// stage feeding it refills it.
    pub fn tick(&mut self) {
        self.cycle += 1;
        self.stats.cycles += 1;
        if self.trace_enabled() {
            tracing::trace!(cycle = self.cycle, pc = self.pc, "tick");
        }
        self.commit_stage();
        self.memory_complete_stage();
        self.execute_stage();
        self.memory_issue_stage();
        self.issue_stage();
        self.dispatch_stage();
        self.rename_stage();
        self.fetch_stage();
    }

    fn trace_enabled(&self) -> bool {
        cfg!(feature = "always-trace") || self.config.general.trace
    }

    /// Returns true once fetch has left the program and the pipeline has
    /// drained.
    ///
    /// Fetch leaves the program by running off its end or by jumping to an
    /// address holding no instruction, such as a misaligned one.
    pub fn is_finished(&self) -> bool {
        self.program.fetch(self.pc).is_none()
            && self.fetched.is_empty()
            && self.renamed.is_empty()
            && self.rob.is_empty()
    }

    /// The program being run.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register by name, e.g. `x1` or `t0`.
    pub fn register(&self, name: &str) -> Option<&Register> {
        self.registers.by_name(name)
    }

    /// Committed integer value of an architectural register.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownRegister`] for an unknown name.
    pub fn read_register(&self, name: &str) -> Result<i64> {
        self.register(name)
            .map(Register::as_i64)
            .ok_or_else(|| SimError::UnknownRegister(name.to_string()))
    }

    /// In-flight instruction by id.
    pub fn instruction(&self, id: InstrId) -> Option<&SimInstruction> {
        self.instructions.get(&id)
    }

    /// Renamed code line of an in-flight instruction, e.g. `add t0 x2 x3`.
    pub fn renamed_code(&self, id: InstrId) -> Option<String> {
        self.instruction(id).map(|i| i.renamed_code(&self.registers))
    }

    /// Code lines in the fetch latch.
    pub fn fetched_code(&self) -> Vec<String> {
        self.fetched.iter().map(|f| f.descriptor.to_string()).collect()
    }

    /// Renamed code lines in the rename latch.
    pub fn renamed_latch_code(&self) -> Vec<String> {
        self.code_of(&self.renamed)
    }

    /// Issue window of `class`, if the class has one.
    pub fn window(&self, class: UnitClass) -> Option<&IssueWindow> {
        self.windows.iter().find(|w| w.class() == class)
    }

    /// Renamed code lines waiting in the issue window of `class`.
    pub fn window_code(&self, class: UnitClass) -> Vec<String> {
        self.window(class)
            .map(|w| self.code_of(w.waiting()))
            .unwrap_or_default()
    }

    /// Renamed code line of the instruction occupying unit `name`.
    pub fn unit_code(&self, name: &str) -> Option<String> {
        let slot = self.units.by_name(name)?.slot?;
        self.renamed_code(slot.id)
    }

    /// Renamed code lines of the ROB, head first.
    pub fn rob_code(&self) -> Vec<String> {
        let ids: Vec<InstrId> = self.rob.entries().map(|e| e.id).collect();
        self.code_of(&ids)
    }

    /// Reads `bytes` bytes of data memory without timing side effects.
    pub fn memory_value(&self, address: u64, bytes: u8) -> u64 {
        self.memory.peek(address, bytes)
    }

    fn code_of(&self, ids: &[InstrId]) -> Vec<String> {
        ids.iter().filter_map(|id| self.renamed_code(*id)).collect()
    }
}

/// Index of the issue window serving `class`.
fn window_index(class: UnitClass) -> usize {
    let Some(index) = UnitClass::ISSUED.iter().position(|c| *c == class) else {
        panic!("{class:?} has no issue window");
    };
    index
}
