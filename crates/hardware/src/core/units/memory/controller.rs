//! Memory latency models.
//!
//! This module provides:
//! 1. **Simple:** Fixed latency per load and per store.
//! 2. **Dram:** Row-buffer-aware latency (CAS, RAS, precharge).
//!
//! The controller's open-row state is part of the memory model, so it is
//! snapshotted with everything else.

use crate::config::{MemoryConfig, MemoryController};
use serde::Serialize;

/// Bytes per DRAM row.
const ROW_BYTES: u64 = 2048;

/// Latency model with its mutable timing state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum LatencyModel {
    /// Fixed latencies.
    Simple {
        /// Cycles per load.
        load: u32,
        /// Cycles per store.
        store: u32,
    },
    /// Row-buffer model.
    Dram {
        /// Currently open row.
        open_row: Option<u64>,
        /// Column access latency.
        t_cas: u32,
        /// Row activation latency.
        t_ras: u32,
        /// Precharge latency.
        t_pre: u32,
    },
}

impl LatencyModel {
    /// Builds the model selected by `config`.
    pub const fn new(config: &MemoryConfig) -> Self {
        match config.controller {
            MemoryController::Simple => Self::Simple {
                load: config.load_latency,
                store: config.store_latency,
            },
            MemoryController::Dram => Self::Dram {
                open_row: None,
                t_cas: config.t_cas,
                t_ras: config.t_ras,
                t_pre: config.t_pre,
            },
        }
    }

    /// Cycles for an access to `address`, updating row state.
    pub fn access_latency(&mut self, address: u64, is_store: bool) -> u32 {
        match self {
            Self::Simple { load, store } => {
                if is_store {
                    *store
                } else {
                    *load
                }
            }
            Self::Dram {
                open_row,
                t_cas,
                t_ras,
                t_pre,
            } => {
                let row = address / ROW_BYTES;
                match open_row.replace(row) {
                    Some(open) if open == row => *t_cas,
                    Some(_) => *t_pre + *t_ras + *t_cas,
                    None => *t_ras + *t_cas,
                }
            }
        }
    }
}
