//! Simulator error types.
//!
//! Only recoverable conditions live here: bad input (configuration, program
//! descriptors) and benign requests the caller may retry, such as stepping
//! back past cycle 0. Broken pipeline invariants panic instead, because a
//! simulation that continues past them produces silently wrong results.

use thiserror::Error;

/// Errors reported by the simulator's public API.
#[derive(Debug, Error)]
pub enum SimError {
    /// A backward step was requested with no earlier cycle recorded.
    #[error("cannot step back: no earlier cycle recorded (at cycle {cycle})")]
    NoEarlierCycle {
        /// Cycle the simulator is currently at.
        cycle: u64,
    },

    /// An operand or accessor named a register that does not exist.
    #[error("unknown register `{0}`")]
    UnknownRegister(String),

    /// A branch or jump referenced a label missing from the program.
    #[error("unknown label `{0}`")]
    UnknownLabel(String),

    /// An instruction descriptor's operand list does not fit its operation.
    #[error("invalid operands for `{mnemonic}`: {reason}")]
    InvalidOperands {
        /// Mnemonic of the offending instruction.
        mnemonic: String,
        /// What is wrong with the operand list.
        reason: String,
    },

    /// The configuration cannot produce a working core.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON input failed to parse.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Reading an input file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SimError>;
