//! Arena handles.
//!
//! Components never hold references to each other. The ROB, issue windows,
//! buffers and function units all refer to an in-flight instruction by its
//! program-order [`InstrId`], and operands refer to registers by
//! [`RegisterId`], an index into the register file.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Program-order id of a dynamic instruction.
///
/// Ids are handed out monotonically at rename, so comparing two ids compares
/// their age: the smaller id is the older instruction.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct InstrId(pub u64);

impl InstrId {
    /// Returns the id that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for InstrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a register inside the unified register file.
///
/// Architectural registers occupy the low indices, speculative tags follow.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RegisterId(pub usize);
