//! A single register and its readiness state.

use serde::Serialize;
use std::fmt;

/// Where a register's value stands in the rename lifecycle.
///
/// Architectural registers are always `Assigned`. A speculative tag moves
/// `Free -> Allocated` when rename maps it, `Allocated -> Executed` when its
/// producer's result is broadcast, `Executed -> Assigned` when the producer
/// commits while readers still reference the tag, and back to `Free` once
/// the last reference is released.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Readiness {
    /// Unmapped and available for renaming.
    Free,
    /// Mapped by rename, value not yet produced.
    Allocated,
    /// Value committed and authoritative.
    Assigned,
    /// Value produced by a functional unit, not yet committed.
    Executed,
}

impl Readiness {
    /// Returns true if a reader may consume the value.
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Assigned | Self::Executed)
    }
}

/// Value domain of a register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum RegisterKind {
    /// 64-bit integer register.
    Integer,
    /// Double-precision float register, stored as raw bits.
    Float,
}

/// An architectural register or a speculative tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Register {
    /// Name as rendered, e.g. `x2` or `t0`.
    pub name: String,
    /// Value domain.
    pub kind: RegisterKind,
    /// Raw value bits.
    pub value: u64,
    /// Lifecycle state.
    pub readiness: Readiness,
    /// Hardwired register such as `x0`; never renamed, never written.
    pub constant: bool,
    /// True for rename tags, false for architectural registers.
    pub speculative: bool,
    /// Outstanding references held by in-flight instructions.
    pub references: u32,
}

impl Register {
    /// Creates an architectural register holding zero.
    pub fn architectural(name: String, kind: RegisterKind, constant: bool) -> Self {
        Self {
            name,
            kind,
            value: 0,
            readiness: Readiness::Assigned,
            constant,
            speculative: false,
            references: 0,
        }
    }

    /// Creates a free speculative tag.
    pub fn tag(name: String) -> Self {
        Self {
            name,
            kind: RegisterKind::Integer,
            value: 0,
            readiness: Readiness::Free,
            constant: false,
            speculative: true,
            references: 0,
        }
    }

    /// Value reinterpreted as a signed integer.
    pub const fn as_i64(&self) -> i64 {
        self.value as i64
    }

    /// Value reinterpreted as a double.
    pub const fn as_f64(&self) -> f64 {
        f64::from_bits(self.value)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RegisterKind::Integer => write!(f, "{}={}", self.name, self.as_i64()),
            RegisterKind::Float => write!(f, "{}={}", self.name, self.as_f64()),
        }
    }
}
