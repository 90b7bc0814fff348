//! Units consumed by the out-of-order engine as black boxes.

/// Branch prediction (static, gshare, BTB).
pub mod bru;

/// Set-associative data cache and its replacement policies.
pub mod cache;

/// Data memory and its latency models.
pub mod memory;
