//! Common types shared by every part of the simulator.
//!
//! 1. **Errors:** The `SimError` enum and the crate `Result` alias.
//! 2. **Identifiers:** Program-order instruction ids and register handles.

/// Error types for recoverable failures.
pub mod error;

/// Identifier newtypes used as arena handles.
pub mod ids;

pub use error::{Result, SimError};
pub use ids::{InstrId, RegisterId};
