//! Configuration system for the core simulator.
//!
//! This module defines every knob that shapes the simulated core. It provides:
//! 1. **Defaults:** Baseline widths, capacities, latencies and predictor sizes.
//! 2. **Structures:** Hierarchical config for general, pipeline, predictor, memory,
//!    function units and initial register values.
//! 3. **Enums:** Unit classes, operation groups, predictor kinds and counter states.
//!
//! Configuration is supplied as JSON (`Config::from_json`) or built with `Config::default()`.

use crate::common::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default configuration constants for the simulator.
mod defaults {
    /// Instructions fetched per cycle.
    pub const FETCH_WIDTH: usize = 3;

    /// Instructions committed per cycle.
    pub const COMMIT_WIDTH: usize = 4;

    /// Reorder buffer capacity.
    pub const ROB_SIZE: usize = 256;

    /// Load buffer capacity.
    pub const LOAD_BUFFER_SIZE: usize = 64;

    /// Store buffer capacity.
    pub const STORE_BUFFER_SIZE: usize = 64;

    /// Number of speculative register tags.
    pub const SPECULATIVE_REGISTERS: usize = 320;

    /// Branch Target Buffer entries (power of two).
    pub const BTB_SIZE: usize = 1024;

    /// Pattern history table index width in bits.
    pub const PHT_BITS: u32 = 10;

    /// Global history register width in bits.
    pub const HISTORY_BITS: u32 = 10;

    /// Memory load latency in cycles.
    pub const LOAD_LATENCY: u32 = 1;

    /// Memory store latency in cycles.
    pub const STORE_LATENCY: u32 = 1;

    /// CAS (Column Access Strobe) latency of the row-buffer controller.
    pub const T_CAS: u32 = 14;

    /// RAS (Row Access Strobe) latency of the row-buffer controller.
    pub const T_RAS: u32 = 14;

    /// Precharge latency of the row-buffer controller.
    pub const T_PRE: u32 = 14;

    /// Data cache capacity in bytes.
    pub const CACHE_SIZE: usize = 4096;

    /// Data cache line size in bytes.
    pub const CACHE_LINE: usize = 64;

    /// Data cache associativity.
    pub const CACHE_WAYS: usize = 4;

    /// Data cache hit latency in cycles.
    pub const CACHE_LATENCY: u32 = 1;
}

/// Class of a functional unit, and of the issue window feeding it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum UnitClass {
    /// Integer arithmetic and logic.
    Integer,
    /// Floating-point arithmetic.
    Float,
    /// Branches and jumps.
    Branch,
    /// Address computation for loads and stores.
    LoadStore,
    /// Memory access, fed by the load and store buffers rather than an issue window.
    Memory,
}

impl UnitClass {
    /// Classes that own an issue window, in selection order.
    pub const ISSUED: [Self; 4] = [Self::Integer, Self::Float, Self::Branch, Self::LoadStore];
}

/// Operation group a functional unit can be restricted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Operation {
    /// Additions, including `lui` and `nop`.
    Addition,
    /// Subtractions.
    Subtraction,
    /// Multiplications.
    Multiplication,
    /// Divisions and remainders.
    Division,
    /// And, or, xor.
    Bitwise,
    /// Shifts.
    Shift,
    /// Set-less-than and conditional branches.
    Comparison,
    /// Unconditional jumps.
    Jump,
    /// Loads and stores.
    Memory,
}

/// Branch predictor algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PredictorKind {
    /// Conditional branches always predicted not taken.
    Static,
    /// Global history XOR pc into a table of two-bit counters.
    #[default]
    GShare,
}

/// Memory latency model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum MemoryController {
    /// Fixed load and store latencies.
    #[default]
    Simple,
    /// Row-buffer model: hits pay CAS, misses add RAS and precharge.
    Dram,
}

/// Two-bit saturating counter state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CounterState {
    /// Counter value 0.
    StronglyNotTaken,
    /// Counter value 1.
    #[default]
    WeaklyNotTaken,
    /// Counter value 2.
    WeaklyTaken,
    /// Counter value 3.
    StronglyTaken,
}

impl CounterState {
    /// Raw counter value.
    pub const fn value(self) -> u8 {
        self as u8
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General simulation behaviour.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Widths and capacities of the out-of-order engine.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Branch predictor.
    #[serde(default)]
    pub predictor: PredictorConfig,
    /// Memory model latencies.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Functional units, in unit-index order.
    #[serde(default = "FunctionUnitConfig::default_set")]
    pub function_units: Vec<FunctionUnitConfig>,
    /// Initial architectural register values.
    #[serde(default)]
    pub registers: RegisterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            pipeline: PipelineConfig::default(),
            predictor: PredictorConfig::default(),
            memory: MemoryConfig::default(),
            function_units: FunctionUnitConfig::default_set(),
            registers: RegisterConfig::default(),
        }
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Emit per-cycle trace events.
    #[serde(default)]
    pub trace: bool,
    /// Maximum number of cycles kept for stepping back. `None` keeps all.
    #[serde(default)]
    pub history_limit: Option<usize>,
}

/// Widths and capacities of the out-of-order engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Instructions fetched per cycle.
    #[serde(default = "PipelineConfig::default_fetch_width")]
    pub fetch_width: usize,
    /// Instructions committed per cycle.
    #[serde(default = "PipelineConfig::default_commit_width")]
    pub commit_width: usize,
    /// Reorder buffer capacity.
    #[serde(default = "PipelineConfig::default_rob_size")]
    pub rob_size: usize,
    /// Load buffer capacity.
    #[serde(default = "PipelineConfig::default_load_buffer_size")]
    pub load_buffer_size: usize,
    /// Store buffer capacity.
    #[serde(default = "PipelineConfig::default_store_buffer_size")]
    pub store_buffer_size: usize,
    /// Speculative register tags available for renaming.
    #[serde(default = "PipelineConfig::default_speculative_registers")]
    pub speculative_registers: usize,
}

impl PipelineConfig {
    const fn default_fetch_width() -> usize {
        defaults::FETCH_WIDTH
    }

    const fn default_commit_width() -> usize {
        defaults::COMMIT_WIDTH
    }

    const fn default_rob_size() -> usize {
        defaults::ROB_SIZE
    }

    const fn default_load_buffer_size() -> usize {
        defaults::LOAD_BUFFER_SIZE
    }

    const fn default_store_buffer_size() -> usize {
        defaults::STORE_BUFFER_SIZE
    }

    const fn default_speculative_registers() -> usize {
        defaults::SPECULATIVE_REGISTERS
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_width: defaults::FETCH_WIDTH,
            commit_width: defaults::COMMIT_WIDTH,
            rob_size: defaults::ROB_SIZE,
            load_buffer_size: defaults::LOAD_BUFFER_SIZE,
            store_buffer_size: defaults::STORE_BUFFER_SIZE,
            speculative_registers: defaults::SPECULATIVE_REGISTERS,
        }
    }
}

/// Branch predictor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Prediction algorithm.
    #[serde(default)]
    pub kind: PredictorKind,
    /// Branch Target Buffer entries. Must be a power of two.
    #[serde(default = "PredictorConfig::default_btb_size")]
    pub btb_size: usize,
    /// Pattern history table index width in bits.
    #[serde(default = "PredictorConfig::default_pht_bits")]
    pub pht_bits: u32,
    /// Global history register width in bits.
    #[serde(default = "PredictorConfig::default_history_bits")]
    pub history_bits: u32,
    /// Initial state of every pattern history counter.
    #[serde(default)]
    pub initial_state: CounterState,
}

impl PredictorConfig {
    const fn default_btb_size() -> usize {
        defaults::BTB_SIZE
    }

    const fn default_pht_bits() -> u32 {
        defaults::PHT_BITS
    }

    const fn default_history_bits() -> u32 {
        defaults::HISTORY_BITS
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            kind: PredictorKind::default(),
            btb_size: defaults::BTB_SIZE,
            pht_bits: defaults::PHT_BITS,
            history_bits: defaults::HISTORY_BITS,
            initial_state: CounterState::default(),
        }
    }
}

/// Cache line replacement policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ReplacementPolicy {
    /// Evict lines in the order they were filled.
    Fifo,
    /// Evict the least recently used line.
    #[default]
    Lru,
}

/// Data cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// When false, every access goes straight to the memory controller.
    #[serde(default)]
    pub enabled: bool,
    /// Capacity in bytes.
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: usize,
    /// Line size in bytes. Must be a power of two.
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: usize,
    /// Associativity.
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,
    /// Replacement policy.
    #[serde(default)]
    pub policy: ReplacementPolicy,
    /// Cycles for a hit. A miss adds the controller's latency.
    #[serde(default = "CacheConfig::default_latency")]
    pub latency: u32,
}

impl CacheConfig {
    const fn default_size() -> usize {
        defaults::CACHE_SIZE
    }

    const fn default_line() -> usize {
        defaults::CACHE_LINE
    }

    const fn default_ways() -> usize {
        defaults::CACHE_WAYS
    }

    const fn default_latency() -> u32 {
        defaults::CACHE_LATENCY
    }

    /// Number of sets, or `None` if the geometry does not divide evenly.
    pub fn sets(&self) -> Option<usize> {
        let set_bytes = self.line_bytes.checked_mul(self.ways)?;
        if set_bytes == 0 || self.size_bytes % set_bytes != 0 {
            return None;
        }
        Some(self.size_bytes / set_bytes).filter(|&n| n > 0)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            size_bytes: defaults::CACHE_SIZE,
            line_bytes: defaults::CACHE_LINE,
            ways: defaults::CACHE_WAYS,
            policy: ReplacementPolicy::default(),
            latency: defaults::CACHE_LATENCY,
        }
    }
}

/// Memory model configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Latency model.
    #[serde(default)]
    pub controller: MemoryController,
    /// Cycles a load spends in memory (simple controller).
    #[serde(default = "MemoryConfig::default_load_latency")]
    pub load_latency: u32,
    /// Cycles a store spends in memory (simple controller).
    #[serde(default = "MemoryConfig::default_store_latency")]
    pub store_latency: u32,
    /// CAS latency (row-buffer controller).
    #[serde(default = "MemoryConfig::default_t_cas")]
    pub t_cas: u32,
    /// RAS latency (row-buffer controller).
    #[serde(default = "MemoryConfig::default_t_ras")]
    pub t_ras: u32,
    /// Precharge latency (row-buffer controller).
    #[serde(default = "MemoryConfig::default_t_pre")]
    pub t_pre: u32,
    /// Data cache in front of the controller.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl MemoryConfig {
    const fn default_load_latency() -> u32 {
        defaults::LOAD_LATENCY
    }

    const fn default_store_latency() -> u32 {
        defaults::STORE_LATENCY
    }

    const fn default_t_cas() -> u32 {
        defaults::T_CAS
    }

    const fn default_t_ras() -> u32 {
        defaults::T_RAS
    }

    const fn default_t_pre() -> u32 {
        defaults::T_PRE
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            controller: MemoryController::default(),
            load_latency: defaults::LOAD_LATENCY,
            store_latency: defaults::STORE_LATENCY,
            t_cas: defaults::T_CAS,
            t_ras: defaults::T_RAS,
            t_pre: defaults::T_PRE,
            cache: CacheConfig::default(),
        }
    }
}

/// A single functional unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionUnitConfig {
    /// Display name, e.g. `FX1`.
    pub name: String,
    /// Unit class.
    pub class: UnitClass,
    /// Cycles from issue to completion. For memory units this is added to
    /// the memory model's latency.
    pub latency: u32,
    /// Operation groups handled. Empty means every operation of the class.
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl FunctionUnitConfig {
    /// Convenience constructor.
    pub fn new(name: &str, class: UnitClass, latency: u32, operations: &[Operation]) -> Self {
        Self {
            name: name.to_string(),
            class,
            latency,
            operations: operations.to_vec(),
        }
    }

    /// The reference unit set: two adders and a subtractor per arithmetic
    /// class, one address unit, two branch units and one memory port.
    pub fn default_set() -> Vec<Self> {
        use Operation::{Addition, Bitwise, Comparison, Division, Multiplication, Shift, Subtraction};
        let int_add = [Addition, Bitwise, Shift, Comparison, Multiplication, Division];
        vec![
            Self::new("FX1", UnitClass::Integer, 2, &int_add),
            Self::new("FX2", UnitClass::Integer, 2, &int_add),
            Self::new("FX3", UnitClass::Integer, 2, &[Subtraction]),
            Self::new("FP1", UnitClass::Float, 2, &[Addition, Multiplication, Division]),
            Self::new("FP2", UnitClass::Float, 2, &[Addition, Multiplication, Division]),
            Self::new("FP3", UnitClass::Float, 2, &[Subtraction]),
            Self::new("L/S", UnitClass::LoadStore, 1, &[]),
            Self::new("BR1", UnitClass::Branch, 3, &[]),
            Self::new("BR2", UnitClass::Branch, 3, &[]),
            Self::new("MEM", UnitClass::Memory, 0, &[]),
        ]
    }

    /// Returns true if this unit can execute `operation`.
    pub fn supports(&self, operation: Operation) -> bool {
        self.operations.is_empty() || self.operations.contains(&operation)
    }
}

/// Initial register contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterConfig {
    /// Integer registers by name, e.g. `{"x2": 25}`.
    #[serde(default)]
    pub integer: BTreeMap<String, i64>,
    /// Float registers by name, e.g. `{"f1": 5.5}`.
    #[serde(default)]
    pub float: BTreeMap<String, f64>,
}

impl Config {
    /// Parses a JSON configuration. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Json`] on malformed input and
    /// [`SimError::InvalidConfig`] if validation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use ooosim_core::config::Config;
    ///
    /// let cfg = Config::from_json(r#"{"pipeline": {"rob_size": 8}}"#).unwrap();
    /// assert_eq!(cfg.pipeline.rob_size, 8);
    /// assert_eq!(cfg.pipeline.fetch_width, 3);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be read, otherwise as
    /// [`Config::from_json`].
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Checks that the configuration describes a core that can make progress.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] naming the first problem found.
    pub fn validate(&self) -> Result<()> {
        let p = &self.pipeline;
        for (name, value) in [
            ("fetch_width", p.fetch_width),
            ("commit_width", p.commit_width),
            ("rob_size", p.rob_size),
            ("load_buffer_size", p.load_buffer_size),
            ("store_buffer_size", p.store_buffer_size),
            ("speculative_registers", p.speculative_registers),
        ] {
            if value == 0 {
                return Err(SimError::InvalidConfig(format!("{name} must be non-zero")));
            }
        }
        if !self.predictor.btb_size.is_power_of_two() {
            return Err(SimError::InvalidConfig(format!(
                "btb_size {} is not a power of two",
                self.predictor.btb_size
            )));
        }
        if self.predictor.pht_bits > 24 || self.predictor.history_bits > 63 {
            return Err(SimError::InvalidConfig(
                "predictor table or history too wide".to_string(),
            ));
        }
        let cache = &self.memory.cache;
        if cache.enabled {
            if !cache.line_bytes.is_power_of_two() {
                return Err(SimError::InvalidConfig(format!(
                    "cache line_bytes {} is not a power of two",
                    cache.line_bytes
                )));
            }
            if cache.sets().is_none() {
                return Err(SimError::InvalidConfig(format!(
                    "cache of {} bytes cannot hold {}-way sets of {}-byte lines",
                    cache.size_bytes, cache.ways, cache.line_bytes
                )));
            }
        }
        for class in [
            UnitClass::Integer,
            UnitClass::Branch,
            UnitClass::LoadStore,
            UnitClass::Memory,
        ] {
            if !self.function_units.iter().any(|fu| fu.class == class) {
                return Err(SimError::InvalidConfig(format!("no {class:?} unit configured")));
            }
        }
        Ok(())
    }

    /// Returns true if some unit of `class` accepts `operation`.
    pub fn has_unit_for(&self, class: UnitClass, operation: Operation) -> bool {
        self.function_units
            .iter()
            .any(|fu| fu.class == class && fu.supports(operation))
    }
}
