//! Issue windows.
//!
//! One window per issued unit class holds dispatched instructions until
//! their operands are ready. Selection scans in program order and hands the
//! oldest ready instruction to the first idle capable unit, repeating until
//! the window or the class's units are exhausted.

use crate::common::ids::InstrId;
use crate::config::{Operation, UnitClass};
use crate::core::pipeline::function_unit::FunctionUnitPool;
use serde::Serialize;

/// Waiting instructions of one unit class, oldest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IssueWindow {
    class: UnitClass,
    waiting: Vec<InstrId>,
}

impl IssueWindow {
    /// Creates an empty window for `class`.
    pub const fn new(class: UnitClass) -> Self {
        Self {
            class,
            waiting: Vec::new(),
        }
    }

    /// Unit class served by this window.
    pub const fn class(&self) -> UnitClass {
        self.class
    }

    /// Accepts a dispatched instruction.
    pub fn accept(&mut self, id: InstrId) {
        assert!(
            self.waiting.last().is_none_or(|last| *last < id),
            "issue window accepts in program order"
        );
        self.waiting.push(id);
    }

    /// Issues ready instructions to idle units.
    ///
    /// `ready` returns the operation group of an instruction whose operands
    /// are all available, or `None` if it must keep waiting. Issued
    /// instructions leave the window and are returned with their unit index.
    pub fn select(
        &mut self,
        units: &mut FunctionUnitPool,
        mut ready: impl FnMut(InstrId) -> Option<Operation>,
    ) -> Vec<(InstrId, usize)> {
        let mut issued = Vec::new();
        for &id in &self.waiting {
            if !units.has_idle(self.class) {
                break;
            }
            let Some(operation) = ready(id) else {
                continue;
            };
            if let Some(unit) = units.first_idle(self.class, operation) {
                units.start(unit, id, 0, None);
                issued.push((id, unit));
            }
        }
        self.waiting.retain(|id| !issued.iter().any(|(i, _)| i == id));
        issued
    }

    /// Drops every instruction matching `squashed`.
    pub fn purge(&mut self, squashed: impl Fn(InstrId) -> bool) {
        self.waiting.retain(|id| !squashed(*id));
    }

    /// Waiting instructions, oldest first.
    pub fn waiting(&self) -> &[InstrId] {
        &self.waiting
    }

    /// Returns true if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}
