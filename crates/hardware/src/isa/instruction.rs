//! Static instruction descriptors.
//!
//! A descriptor is what the assembler hands the core: an [`OpKind`] and a
//! typed operand list. Descriptors never change once a [`Program`] is built;
//! everything that varies per execution lives on the dynamic instance.
//!
//! [`Program`]: super::Program

use super::op::{OpKind, OperandRole};
use crate::common::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operand value as written in the program.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Arg {
    /// Integer immediate.
    Int(i64),
    /// Register or label name, depending on the operand position.
    Name(String),
}

/// A typed operand of a static instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Operand {
    /// Register written by the instruction.
    Destination(String),
    /// Register read by the instruction.
    Source(String),
    /// Signed immediate.
    Immediate(i64),
    /// Code label and its byte address once the program is linked.
    Label {
        /// Label name as written.
        name: String,
        /// Resolved byte address.
        address: u64,
    },
}

impl Operand {
    /// Role this operand plays.
    pub const fn role(&self) -> OperandRole {
        match self {
            Self::Destination(_) => OperandRole::Destination,
            Self::Source(_) => OperandRole::Source,
            Self::Immediate(_) => OperandRole::Immediate,
            Self::Label { .. } => OperandRole::Label,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Destination(r) | Self::Source(r) => f.write_str(r),
            Self::Immediate(v) => write!(f, "{v}"),
            Self::Label { name, .. } => f.write_str(name),
        }
    }
}

/// Unvalidated descriptor as it appears in JSON.
#[derive(Clone, Debug, Deserialize)]
struct RawInstruction {
    op: OpKind,
    #[serde(default)]
    args: Vec<Arg>,
}

/// An immutable instruction descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawInstruction")]
pub struct StaticInstruction {
    op: OpKind,
    operands: Vec<Operand>,
}

impl TryFrom<RawInstruction> for StaticInstruction {
    type Error = SimError;

    fn try_from(raw: RawInstruction) -> Result<Self> {
        Self::new(raw.op, raw.args)
    }
}

impl StaticInstruction {
    /// Builds a descriptor, checking `args` against the operation's shape.
    ///
    /// Labels are recorded with address 0 until the owning program links
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidOperands`] when the argument count or an
    /// argument's kind does not match the shape.
    pub fn new(op: OpKind, args: Vec<Arg>) -> Result<Self> {
        let shape = op.shape();
        let invalid = |reason: String| SimError::InvalidOperands {
            mnemonic: op.mnemonic().to_string(),
            reason,
        };
        if args.len() != shape.len() {
            return Err(invalid(format!(
                "expected {} operands, got {}",
                shape.len(),
                args.len()
            )));
        }
        let operands = shape
            .iter()
            .zip(args)
            .enumerate()
            .map(|(i, (role, arg))| match (role, arg) {
                (OperandRole::Destination, Arg::Name(r)) => Ok(Operand::Destination(r)),
                (OperandRole::Source, Arg::Name(r)) => Ok(Operand::Source(r)),
                (OperandRole::Immediate, Arg::Int(v)) => Ok(Operand::Immediate(v)),
                (OperandRole::Label, Arg::Name(name)) => Ok(Operand::Label { name, address: 0 }),
                (role, arg) => Err(invalid(format!(
                    "operand {i} should be {role:?}, found {arg:?}"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { op, operands })
    }

    /// The `nop` descriptor.
    pub const fn nop() -> Self {
        Self {
            op: OpKind::Nop,
            operands: Vec::new(),
        }
    }

    /// Operation kind.
    pub const fn op(&self) -> OpKind {
        self.op
    }

    /// Operands in rendering order.
    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    /// Destination register name, if any.
    pub fn destination(&self) -> Option<&str> {
        self.operands.iter().find_map(|o| match o {
            Operand::Destination(r) => Some(r.as_str()),
            _ => None,
        })
    }

    /// Source register names in shape order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.operands.iter().filter_map(|o| match o {
            Operand::Source(r) => Some(r.as_str()),
            _ => None,
        })
    }

    /// Immediate operand, or 0.
    pub fn immediate(&self) -> i64 {
        self.operands
            .iter()
            .find_map(|o| match o {
                Operand::Immediate(v) => Some(*v),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Resolved label address, or 0.
    pub fn label_address(&self) -> u64 {
        self.operands
            .iter()
            .find_map(|o| match o {
                Operand::Label { address, .. } => Some(*address),
                _ => None,
            })
            .unwrap_or(0)
    }

    pub(super) fn labels_mut(&mut self) -> impl Iterator<Item = (&str, &mut u64)> {
        self.operands.iter_mut().filter_map(|o| match o {
            Operand::Label { name, address } => Some((name.as_str(), address)),
            _ => None,
        })
    }
}

impl fmt::Display for StaticInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.op.mnemonic())?;
        for operand in &self.operands {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}
