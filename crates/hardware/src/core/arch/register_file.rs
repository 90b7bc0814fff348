//! Unified Register File.
//!
//! This module provides the `RegisterFile` struct, which stores architectural
//! and speculative registers side by side. It provides:
//! 1. **Unified Storage:** `x0`-`x31`, `f0`-`f31`, then tags `t0`, `t1`, ...
//! 2. **Name Resolution:** Mapping register names to [`RegisterId`] handles.
//! 3. **Invariant Enforcement:** `x0` is constant and always reads zero.

use super::register::{Readiness, Register, RegisterKind};
use crate::common::error::{Result, SimError};
use crate::common::ids::RegisterId;
use crate::config::RegisterConfig;
use serde::Serialize;

/// Number of integer architectural registers.
pub const INTEGER_REGISTERS: usize = 32;
/// Number of float architectural registers.
pub const FLOAT_REGISTERS: usize = 32;
/// Index of the first speculative tag.
pub const FIRST_TAG: usize = INTEGER_REGISTERS + FLOAT_REGISTERS;

/// Architectural registers followed by the speculative tag pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterFile {
    registers: Vec<Register>,
}

impl RegisterFile {
    /// Creates a register file with `tags` speculative registers, all values zero.
    pub fn new(tags: usize) -> Self {
        let mut registers = Vec::with_capacity(FIRST_TAG + tags);
        for i in 0..INTEGER_REGISTERS {
            registers.push(Register::architectural(
                format!("x{i}"),
                RegisterKind::Integer,
                i == 0,
            ));
        }
        for i in 0..FLOAT_REGISTERS {
            registers.push(Register::architectural(
                format!("f{i}"),
                RegisterKind::Float,
                false,
            ));
        }
        registers.extend((0..tags).map(|i| Register::tag(format!("t{i}"))));
        Self { registers }
    }

    /// Creates a register file and applies the configured initial values.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownRegister`] for a name that is not an
    /// architectural register of the right kind.
    pub fn with_initial_values(tags: usize, init: &RegisterConfig) -> Result<Self> {
        let mut file = Self::new(tags);
        for (name, value) in &init.integer {
            file.set_architectural(name, RegisterKind::Integer, *value as u64)?;
        }
        for (name, value) in &init.float {
            file.set_architectural(name, RegisterKind::Float, value.to_bits())?;
        }
        Ok(file)
    }

    fn set_architectural(&mut self, name: &str, kind: RegisterKind, bits: u64) -> Result<()> {
        let id = self
            .resolve(name)
            .filter(|id| !self.is_speculative(*id) && self[*id].kind == kind)
            .ok_or_else(|| SimError::UnknownRegister(name.to_string()))?;
        self.write(id, bits);
        Ok(())
    }

    /// Resolves a register name, e.g. `x2`, `f1` or `t0`.
    pub fn resolve(&self, name: &str) -> Option<RegisterId> {
        let (prefix, index) = name.split_at_checked(1)?;
        let index: usize = index.parse().ok()?;
        let id = match prefix {
            "x" if index < INTEGER_REGISTERS => index,
            "f" if index < FLOAT_REGISTERS => INTEGER_REGISTERS + index,
            "t" if FIRST_TAG + index < self.registers.len() => FIRST_TAG + index,
            _ => return None,
        };
        Some(RegisterId(id))
    }

    /// Looks a register up by name.
    pub fn by_name(&self, name: &str) -> Option<&Register> {
        self.resolve(name).map(|id| &self[id])
    }

    /// Returns true if `id` is a speculative tag.
    pub const fn is_speculative(&self, id: RegisterId) -> bool {
        id.0 >= FIRST_TAG
    }

    /// Raw value of a register.
    pub fn value(&self, id: RegisterId) -> u64 {
        self[id].value
    }

    /// Returns true if a reader may consume the register's value.
    pub fn is_ready(&self, id: RegisterId) -> bool {
        self[id].readiness.is_ready()
    }

    /// Writes a value. Writes to constant registers are ignored.
    pub fn write(&mut self, id: RegisterId, value: u64) {
        let reg = &mut self[id];
        if !reg.constant {
            reg.value = value;
        }
    }

    /// Updates a register's readiness.
    pub fn set_readiness(&mut self, id: RegisterId, readiness: Readiness) {
        self[id].readiness = readiness;
    }

    /// Handles of every speculative tag.
    pub fn tag_ids(&self) -> impl DoubleEndedIterator<Item = RegisterId> + use<> {
        (FIRST_TAG..self.registers.len()).map(RegisterId)
    }

    /// Number of speculative tags.
    pub fn tag_count(&self) -> usize {
        self.registers.len() - FIRST_TAG
    }

    /// Every register, architectural first.
    pub fn iter(&self) -> impl Iterator<Item = &Register> {
        self.registers.iter()
    }

    /// Architectural registers only.
    pub fn architectural(&self) -> &[Register] {
        &self.registers[..FIRST_TAG]
    }
}

impl std::ops::Index<RegisterId> for RegisterFile {
    type Output = Register;

    fn index(&self, id: RegisterId) -> &Register {
        &self.registers[id.0]
    }
}

impl std::ops::IndexMut<RegisterId> for RegisterFile {
    fn index_mut(&mut self, id: RegisterId) -> &mut Register {
        &mut self.registers[id.0]
    }
}
