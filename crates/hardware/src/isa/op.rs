//! Operation kinds and their evaluation.
//!
//! The opcode set is closed, so every per-operation behaviour is a `match`
//! on [`OpKind`]: which unit class executes it, which operand shape it takes,
//! how it renders, and how it computes a result from operand values.

use crate::config::{Operation, UnitClass};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role an operand plays in an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperandRole {
    /// Register written by the instruction.
    Destination,
    /// Register read by the instruction.
    Source,
    /// Signed immediate.
    Immediate,
    /// Code label, resolved to a byte address.
    Label,
}

use OperandRole::{Destination as D, Immediate as I, Label as L, Source as S};

/// Every operation the core can execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum OpKind {
    Nop,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Sll,
    Srl,
    Sra,
    Slt,
    Sltu,
    Addi,
    Subi,
    Andi,
    Ori,
    Xori,
    Slli,
    Srli,
    Srai,
    Slti,
    Lui,
    Fadd,
    Fsub,
    Fmul,
    Fdiv,
    Lb,
    Lbu,
    Lh,
    Lhu,
    Lw,
    Lwu,
    Ld,
    Sb,
    Sh,
    Sw,
    Sd,
    Beq,
    Bne,
    Blt,
    Bge,
    Bltu,
    Bgeu,
    Jal,
    Jalr,
}

/// Width and sign extension of a memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessWidth {
    /// Access size in bytes.
    pub bytes: u8,
    /// Whether a loaded value is sign-extended.
    pub signed: bool,
}

/// Result of evaluating an operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    /// Value for the destination register.
    Value(u64),
    /// Effective address of a load or store.
    Address(u64),
    /// Resolved control flow of a branch or jump.
    Branch {
        /// Whether control transfers to `target`.
        taken: bool,
        /// Destination address when taken.
        target: u64,
        /// Return address written to the destination register, for jumps.
        link: Option<u64>,
    },
}

impl OpKind {
    /// Unit class whose issue window and units handle this operation.
    pub const fn class(self) -> UnitClass {
        match self {
            Self::Fadd | Self::Fsub | Self::Fmul | Self::Fdiv => UnitClass::Float,
            Self::Lb
            | Self::Lbu
            | Self::Lh
            | Self::Lhu
            | Self::Lw
            | Self::Lwu
            | Self::Ld
            | Self::Sb
            | Self::Sh
            | Self::Sw
            | Self::Sd => UnitClass::LoadStore,
            Self::Beq
            | Self::Bne
            | Self::Blt
            | Self::Bge
            | Self::Bltu
            | Self::Bgeu
            | Self::Jal
            | Self::Jalr => UnitClass::Branch,
            _ => UnitClass::Integer,
        }
    }

    /// Operation group used to match instructions with capable units.
    pub const fn operation(self) -> Operation {
        match self {
            Self::Add | Self::Addi | Self::Lui | Self::Nop | Self::Fadd => Operation::Addition,
            Self::Sub | Self::Subi | Self::Fsub => Operation::Subtraction,
            Self::Mul | Self::Fmul => Operation::Multiplication,
            Self::Div | Self::Rem | Self::Fdiv => Operation::Division,
            Self::And | Self::Or | Self::Xor | Self::Andi | Self::Ori | Self::Xori => {
                Operation::Bitwise
            }
            Self::Sll | Self::Srl | Self::Sra | Self::Slli | Self::Srli | Self::Srai => {
                Operation::Shift
            }
            Self::Slt | Self::Sltu | Self::Slti => Operation::Comparison,
            Self::Beq | Self::Bne | Self::Blt | Self::Bge | Self::Bltu | Self::Bgeu => {
                Operation::Comparison
            }
            Self::Jal | Self::Jalr => Operation::Jump,
            _ => Operation::Memory,
        }
    }

    /// Operand roles in rendering order.
    ///
    /// Stores list the value register before the base register, matching
    /// the `sw x3 x2 0` form.
    pub const fn shape(self) -> &'static [OperandRole] {
        match self {
            Self::Nop => &[],
            Self::Add
            | Self::Sub
            | Self::Mul
            | Self::Div
            | Self::Rem
            | Self::And
            | Self::Or
            | Self::Xor
            | Self::Sll
            | Self::Srl
            | Self::Sra
            | Self::Slt
            | Self::Sltu
            | Self::Fadd
            | Self::Fsub
            | Self::Fmul
            | Self::Fdiv => &[D, S, S],
            Self::Addi
            | Self::Subi
            | Self::Andi
            | Self::Ori
            | Self::Xori
            | Self::Slli
            | Self::Srli
            | Self::Srai
            | Self::Slti
            | Self::Lb
            | Self::Lbu
            | Self::Lh
            | Self::Lhu
            | Self::Lw
            | Self::Lwu
            | Self::Ld
            | Self::Jalr => &[D, S, I],
            Self::Lui => &[D, I],
            Self::Sb | Self::Sh | Self::Sw | Self::Sd => &[S, S, I],
            Self::Beq | Self::Bne | Self::Blt | Self::Bge | Self::Bltu | Self::Bgeu => {
                &[S, S, L]
            }
            Self::Jal => &[D, L],
        }
    }

    /// Assembly mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Nop => "nop",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Rem => "rem",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Sll => "sll",
            Self::Srl => "srl",
            Self::Sra => "sra",
            Self::Slt => "slt",
            Self::Sltu => "sltu",
            Self::Addi => "addi",
            Self::Subi => "subi",
            Self::Andi => "andi",
            Self::Ori => "ori",
            Self::Xori => "xori",
            Self::Slli => "slli",
            Self::Srli => "srli",
            Self::Srai => "srai",
            Self::Slti => "slti",
            Self::Lui => "lui",
            Self::Fadd => "fadd",
            Self::Fsub => "fsub",
            Self::Fmul => "fmul",
            Self::Fdiv => "fdiv",
            Self::Lb => "lb",
            Self::Lbu => "lbu",
            Self::Lh => "lh",
            Self::Lhu => "lhu",
            Self::Lw => "lw",
            Self::Lwu => "lwu",
            Self::Ld => "ld",
            Self::Sb => "sb",
            Self::Sh => "sh",
            Self::Sw => "sw",
            Self::Sd => "sd",
            Self::Beq => "beq",
            Self::Bne => "bne",
            Self::Blt => "blt",
            Self::Bge => "bge",
            Self::Bltu => "bltu",
            Self::Bgeu => "bgeu",
            Self::Jal => "jal",
            Self::Jalr => "jalr",
        }
    }

    /// Access width for loads and stores, `None` otherwise.
    pub const fn access_width(self) -> Option<AccessWidth> {
        let (bytes, signed) = match self {
            Self::Lb => (1, true),
            Self::Lbu | Self::Sb => (1, false),
            Self::Lh => (2, true),
            Self::Lhu | Self::Sh => (2, false),
            Self::Lw => (4, true),
            Self::Lwu | Self::Sw => (4, false),
            Self::Ld | Self::Sd => (8, false),
            _ => return None,
        };
        Some(AccessWidth { bytes, signed })
    }

    /// Returns true for loads.
    pub const fn is_load(self) -> bool {
        matches!(
            self,
            Self::Lb | Self::Lbu | Self::Lh | Self::Lhu | Self::Lw | Self::Lwu | Self::Ld
        )
    }

    /// Returns true for stores.
    pub const fn is_store(self) -> bool {
        matches!(self, Self::Sb | Self::Sh | Self::Sw | Self::Sd)
    }

    /// Returns true for conditional branches and jumps.
    pub const fn is_control(self) -> bool {
        matches!(self.class(), UnitClass::Branch)
    }

    /// Returns true for jumps, which are always taken.
    pub const fn is_unconditional(self) -> bool {
        matches!(self, Self::Jal | Self::Jalr)
    }

    /// Computes the outcome of the operation.
    ///
    /// `sources` holds source register values in shape order, `imm` the
    /// immediate (or 0), `target` the resolved label address (or 0) and `pc`
    /// the instruction's byte address.
    pub fn evaluate(self, sources: &[u64], imm: i64, target: u64, pc: u64) -> Outcome {
        let a = sources.first().copied().unwrap_or(0);
        let b = sources.get(1).copied().unwrap_or(0);
        let imm_u = imm as u64;
        let value = match self {
            Self::Nop => 0,
            Self::Add => a.wrapping_add(b),
            Self::Sub => a.wrapping_sub(b),
            Self::Mul => a.wrapping_mul(b),
            Self::Div => signed_div(a as i64, b as i64) as u64,
            Self::Rem => signed_rem(a as i64, b as i64) as u64,
            Self::And => a & b,
            Self::Or => a | b,
            Self::Xor => a ^ b,
            Self::Sll => a << (b & 63),
            Self::Srl => a >> (b & 63),
            Self::Sra => ((a as i64) >> (b & 63)) as u64,
            Self::Slt => ((a as i64) < (b as i64)) as u64,
            Self::Sltu => (a < b) as u64,
            Self::Addi => a.wrapping_add(imm_u),
            Self::Subi => a.wrapping_sub(imm_u),
            Self::Andi => a & imm_u,
            Self::Ori => a | imm_u,
            Self::Xori => a ^ imm_u,
            Self::Slli => a << (imm_u & 63),
            Self::Srli => a >> (imm_u & 63),
            Self::Srai => ((a as i64) >> (imm_u & 63)) as u64,
            Self::Slti => ((a as i64) < imm) as u64,
            Self::Lui => imm_u << 12,
            Self::Fadd => (f64::from_bits(a) + f64::from_bits(b)).to_bits(),
            Self::Fsub => (f64::from_bits(a) - f64::from_bits(b)).to_bits(),
            Self::Fmul => (f64::from_bits(a) * f64::from_bits(b)).to_bits(),
            Self::Fdiv => (f64::from_bits(a) / f64::from_bits(b)).to_bits(),
            Self::Lb | Self::Lbu | Self::Lh | Self::Lhu | Self::Lw | Self::Lwu | Self::Ld => {
                return Outcome::Address(a.wrapping_add(imm_u));
            }
            Self::Sb | Self::Sh | Self::Sw | Self::Sd => {
                return Outcome::Address(b.wrapping_add(imm_u));
            }
            Self::Beq => return branch(a == b, target),
            Self::Bne => return branch(a != b, target),
            Self::Blt => return branch((a as i64) < (b as i64), target),
            Self::Bge => return branch((a as i64) >= (b as i64), target),
            Self::Bltu => return branch(a < b, target),
            Self::Bgeu => return branch(a >= b, target),
            Self::Jal => {
                return Outcome::Branch {
                    taken: true,
                    target,
                    link: Some(pc + 4),
                };
            }
            Self::Jalr => {
                return Outcome::Branch {
                    taken: true,
                    target: a.wrapping_add(imm_u) & !1,
                    link: Some(pc + 4),
                };
            }
        };
        Outcome::Value(value)
    }
}

const fn branch(taken: bool, target: u64) -> Outcome {
    Outcome::Branch {
        taken,
        target,
        link: None,
    }
}

// Division by zero and overflow follow RISC-V M: no trap, fixed results.
const fn signed_div(a: i64, b: i64) -> i64 {
    if b == 0 {
        -1
    } else if a == i64::MIN && b == -1 {
        i64::MIN
    } else {
        a / b
    }
}

const fn signed_rem(a: i64, b: i64) -> i64 {
    if b == 0 {
        a
    } else if a == i64::MIN && b == -1 {
        0
    } else {
        a % b
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
