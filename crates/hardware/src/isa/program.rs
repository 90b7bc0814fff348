//! Linked programs.
//!
//! A [`Program`] is the descriptor stream plus its label table. Instruction
//! `i` lives at byte address `4 * i`; labels resolve to the address of the
//! instruction that follows them.

use super::instruction::StaticInstruction;
use crate::common::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Size of one instruction in bytes.
pub const INSTRUCTION_BYTES: u64 = 4;

/// One line of program source: a label or an instruction.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum Line {
    /// Label marking the next instruction.
    Label {
        /// Label name.
        label: String,
    },
    /// An instruction descriptor.
    Instruction(StaticInstruction),
}

#[derive(Deserialize)]
struct ProgramFile {
    code: Vec<Line>,
}

/// An immutable, linked instruction sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Program {
    instructions: Vec<Arc<StaticInstruction>>,
    labels: BTreeMap<String, u64>,
}

impl Program {
    /// Links a sequence of lines, resolving every label operand.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownLabel`] when an operand names a label
    /// that is never defined.
    pub fn new(lines: Vec<Line>) -> Result<Self> {
        let mut instructions = Vec::new();
        let mut labels = BTreeMap::new();
        for line in lines {
            match line {
                Line::Label { label } => {
                    let _ = labels.insert(label, instructions.len() as u64 * INSTRUCTION_BYTES);
                }
                Line::Instruction(ins) => instructions.push(ins),
            }
        }
        for ins in &mut instructions {
            for (name, address) in ins.labels_mut() {
                *address = *labels
                    .get(name)
                    .ok_or_else(|| SimError::UnknownLabel(name.to_string()))?;
            }
        }
        Ok(Self {
            instructions: instructions.into_iter().map(Arc::new).collect(),
            labels,
        })
    }

    /// Links a label-free instruction sequence.
    ///
    /// # Errors
    ///
    /// Fails if any instruction refers to a label.
    pub fn from_instructions(instructions: Vec<StaticInstruction>) -> Result<Self> {
        Self::new(instructions.into_iter().map(Line::Instruction).collect())
    }

    /// Parses a `{"code": [...]}` document.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Json`] for malformed input and any linking error.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ProgramFile = serde_json::from_str(json)?;
        Self::new(file.code)
    }

    /// Reads and parses a program file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be read, otherwise as
    /// [`Program::from_json`].
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Instruction at byte address `pc`, if inside the program.
    pub fn fetch(&self, pc: u64) -> Option<&Arc<StaticInstruction>> {
        if pc % INSTRUCTION_BYTES != 0 {
            return None;
        }
        self.instructions.get((pc / INSTRUCTION_BYTES) as usize)
    }

    /// Byte address one past the last instruction.
    pub fn end_address(&self) -> u64 {
        self.instructions.len() as u64 * INSTRUCTION_BYTES
    }

    /// All instructions in order.
    pub fn instructions(&self) -> &[Arc<StaticInstruction>] {
        &self.instructions
    }

    /// Address of a label.
    pub fn label(&self, name: &str) -> Option<u64> {
        self.labels.get(name).copied()
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true for a program with no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
