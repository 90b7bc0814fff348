//! Functional units.
//!
//! Each unit executes at most one instruction at a time over a fixed
//! latency. Units are kept in configuration order, which is also the
//! tie-break order when several idle units could take an instruction.

use crate::common::ids::InstrId;
use crate::config::{FunctionUnitConfig, Operation, UnitClass};
use serde::Serialize;
use std::sync::Arc;

/// Instruction occupying a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct InFlight {
    /// Instruction being executed.
    pub id: InstrId,
    /// Cycles left before completion.
    pub remaining: u32,
    /// Value captured when the operation started (memory loads).
    pub data: Option<u64>,
}

/// A completed operation, reported by [`FunctionUnitPool::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    /// Index of the unit that finished.
    pub unit: usize,
    /// Instruction that finished.
    pub id: InstrId,
    /// Captured value, if any.
    pub data: Option<u64>,
}

/// A single functional unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FunctionUnit {
    /// Static description.
    pub config: Arc<FunctionUnitConfig>,
    /// Current occupant.
    pub slot: Option<InFlight>,
    /// Cycles spent occupied.
    pub busy_cycles: u64,
}

impl FunctionUnit {
    /// Returns true if the unit holds no instruction.
    pub const fn is_idle(&self) -> bool {
        self.slot.is_none()
    }

    /// Returns true if this idle unit can start `operation` of `class`.
    pub fn accepts(&self, class: UnitClass, operation: Operation) -> bool {
        self.is_idle() && self.config.class == class && self.config.supports(operation)
    }
}

/// All functional units of the core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FunctionUnitPool {
    units: Vec<FunctionUnit>,
}

impl FunctionUnitPool {
    /// Builds one unit per configuration entry.
    pub fn new(configs: &[FunctionUnitConfig]) -> Self {
        Self {
            units: configs
                .iter()
                .map(|c| FunctionUnit {
                    config: Arc::new(c.clone()),
                    slot: None,
                    busy_cycles: 0,
                })
                .collect(),
        }
    }

    /// Index of the first idle unit able to run `operation`.
    pub fn first_idle(&self, class: UnitClass, operation: Operation) -> Option<usize> {
        self.units.iter().position(|u| u.accepts(class, operation))
    }

    /// Returns true if any unit of `class` is idle.
    pub fn has_idle(&self, class: UnitClass) -> bool {
        self.units
            .iter()
            .any(|u| u.config.class == class && u.is_idle())
    }

    /// Starts `id` on `unit`. The unit's own latency is added to `extra_latency`.
    pub fn start(&mut self, unit: usize, id: InstrId, extra_latency: u32, data: Option<u64>) {
        let fu = &mut self.units[unit];
        assert!(fu.is_idle(), "unit {} already busy", fu.config.name);
        fu.slot = Some(InFlight {
            id,
            remaining: fu.config.latency.saturating_add(extra_latency).max(1),
            data,
        });
    }

    /// Advances every busy unit of the given classes by one cycle.
    ///
    /// Returns finished operations sorted by program order; their units are
    /// idle again.
    pub fn tick(&mut self, classes: &[UnitClass]) -> Vec<Completion> {
        let mut done = Vec::new();
        for (index, unit) in self.units.iter_mut().enumerate() {
            if !classes.contains(&unit.config.class) {
                continue;
            }
            let Some(slot) = unit.slot.as_mut() else {
                continue;
            };
            unit.busy_cycles += 1;
            slot.remaining -= 1;
            if slot.remaining == 0 {
                done.push(Completion {
                    unit: index,
                    id: slot.id,
                    data: slot.data,
                });
                unit.slot = None;
            }
        }
        done.sort_by_key(|c| c.id);
        done
    }

    /// Evicts every occupant matching `squashed`.
    pub fn purge(&mut self, squashed: impl Fn(InstrId) -> bool) {
        for unit in &mut self.units {
            if unit.slot.is_some_and(|s| squashed(s.id)) {
                unit.slot = None;
            }
        }
    }

    /// Unit currently holding `id`.
    pub fn holding(&self, id: InstrId) -> Option<usize> {
        self.units
            .iter()
            .position(|u| u.slot.is_some_and(|s| s.id == id))
    }

    /// Every unit in index order.
    pub fn units(&self) -> &[FunctionUnit] {
        &self.units
    }

    /// Unit by display name.
    pub fn by_name(&self, name: &str) -> Option<&FunctionUnit> {
        self.units.iter().find(|u| u.config.name == name)
    }
}
