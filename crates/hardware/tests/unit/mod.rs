/// Single-cycle transcripts of simple programs.
pub mod pipeline_trace;

/// Data hazards through renamed registers.
pub mod dependencies;

/// Store buffer, forwarding and memory ordering.
pub mod memory_ordering;

/// Prediction, misprediction recovery and loops.
pub mod control_flow;

/// Step-back exactness.
pub mod step_back;


/// Reorder buffer ordering properties.
pub mod rob_order;


/// Loading configuration and programs from files.
pub mod config_files;

/// Evaluation of individual operations end to end.
pub mod operations;

/// Data cache hits, misses and step-back.
pub mod data_cache;
