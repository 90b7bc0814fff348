//! Out-of-order pipeline structures.
//!
//! Each structure owns only its own state and refers to instructions and
//! registers through ids, so the CPU can hand them out by exclusive
//! reference one at a time.

/// Fetch-group construction and branch prediction at fetch.
pub mod fetch;

/// Functional units and the unit pool.
pub mod function_unit;

/// Dynamic instruction instances and latch entries.
pub mod instruction;

/// Per-class issue windows.
pub mod issue;

/// Load buffer.
pub mod load_buffer;

/// Rename map table.
pub mod rename;

/// Reorder buffer.
pub mod rob;

/// Store buffer.
pub mod store_buffer;

pub use function_unit::{FunctionUnit, FunctionUnitPool};
pub use instruction::{BranchOutcome, BranchPrediction, FetchedInstruction, SimInstruction};
pub use issue::IssueWindow;
pub use load_buffer::{LoadBuffer, LoadItem};
pub use rename::{RenameMapTable, RenameMapping};
pub use rob::{ReorderBuffer, RobEntry, RobFlags};
pub use store_buffer::{ForwardResult, StoreBuffer, StoreItem};
