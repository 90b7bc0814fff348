//! Instruction descriptors consumed by the core.
//!
//! The core never parses assembly. It receives already-structured
//! descriptors, either built in code or deserialized from JSON, and
//! evaluates them through [`OpKind::evaluate`].

/// Typed operands and static instruction descriptors.
pub mod instruction;

/// Operation kinds, classification and evaluation.
pub mod op;

/// Label linking and the program container.
pub mod program;

pub use instruction::{Arg, Operand, StaticInstruction};
pub use op::{AccessWidth, OpKind, OperandRole, Outcome};
pub use program::{INSTRUCTION_BYTES, Line, Program};
