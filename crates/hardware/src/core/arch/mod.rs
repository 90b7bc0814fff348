//! Architectural and speculative register storage.

/// Register type and readiness lifecycle.
pub mod register;

/// Unified register file.
pub mod register_file;

pub use register::{Readiness, Register, RegisterKind};
pub use register_file::RegisterFile;
