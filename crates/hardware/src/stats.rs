//! Simulation statistics collection and reporting.
//!
//! Counters live inside the CPU state, so stepping back restores them along
//! with everything else.

use crate::config::UnitClass;
use serde::Serialize;

/// Section names for selective stats output.
///
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "instruction_mix", "branch", "memory", "stalls"];

/// Counters gathered while the core runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    /// Cycles simulated.
    pub cycles: u64,
    /// Instructions fetched, including wrong-path ones.
    pub instructions_fetched: u64,
    /// Instructions renamed.
    pub instructions_renamed: u64,
    /// Instructions committed.
    pub instructions_committed: u64,

    /// Committed integer instructions.
    pub committed_integer: u64,
    /// Committed float instructions.
    pub committed_float: u64,
    /// Committed branches and jumps.
    pub committed_branch: u64,
    /// Committed loads.
    pub committed_load: u64,
    /// Committed stores.
    pub committed_store: u64,

    /// Branches resolved by a branch unit.
    pub branches_resolved: u64,
    /// Resolved branches whose prediction was wrong.
    pub branch_mispredictions: u64,

    /// Squash events.
    pub flushes: u64,
    /// Instructions discarded by squashes.
    pub instructions_squashed: u64,

    /// Loads that read data memory.
    pub memory_reads: u64,
    /// Stores written to data memory at commit.
    pub memory_writes: u64,
    /// Loads satisfied from the store buffer.
    pub loads_forwarded: u64,
    /// Loads squashed because an older store resolved to their address.
    pub memory_hazards: u64,
    /// Memory accesses that hit in the data cache.
    pub cache_hits: u64,
    /// Memory accesses that missed in the data cache.
    pub cache_misses: u64,

    /// Cycles rename stalled without a free tag.
    pub stalls_rename: u64,
    /// Cycles dispatch stalled on a full ROB.
    pub stalls_rob: u64,
    /// Cycles dispatch stalled on a full load or store buffer.
    pub stalls_buffer: u64,
}

impl SimStats {
    /// Counts a committed instruction of `class`.
    pub fn record_commit(&mut self, class: UnitClass, is_load: bool) {
        self.instructions_committed += 1;
        match class {
            UnitClass::Integer => self.committed_integer += 1,
            UnitClass::Float => self.committed_float += 1,
            UnitClass::Branch => self.committed_branch += 1,
            UnitClass::LoadStore | UnitClass::Memory => {
                if is_load {
                    self.committed_load += 1;
                } else {
                    self.committed_store += 1;
                }
            }
        }
    }

    /// Counts a memory access against the data cache, if one is fitted.
    pub fn record_cache(&mut self, hit: Option<bool>) {
        match hit {
            Some(true) => self.cache_hits += 1,
            Some(false) => self.cache_misses += 1,
            None => {}
        }
    }

    /// Cache hits as a percentage of cached accesses.
    pub fn cache_hit_rate(&self) -> f64 {
        let accesses = self.cache_hits + self.cache_misses;
        if accesses == 0 {
            0.0
        } else {
            100.0 * self.cache_hits as f64 / accesses as f64
        }
    }

    /// Committed instructions per cycle.
    pub fn ipc(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.instructions_committed as f64 / self.cycles as f64
        }
    }

    /// Fraction of resolved branches predicted correctly, in percent.
    pub fn branch_accuracy(&self) -> f64 {
        if self.branches_resolved == 0 {
            0.0
        } else {
            let correct = self.branches_resolved - self.branch_mispredictions;
            100.0 * correct as f64 / self.branches_resolved as f64
        }
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`].
    /// Pass an empty slice to print all sections.
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let committed = self.instructions_committed.max(1) as f64;
        let cyc = self.cycles.max(1) as f64;
        let pct = |n: u64, of: f64| 100.0 * n as f64 / of;

        if want("summary") {
            println!("\n==========================================================");
            println!("OUT-OF-ORDER CORE SIMULATION STATISTICS");
            println!("==========================================================");
            println!("sim_cycles               {}", self.cycles);
            println!("sim_insts                {}", self.instructions_committed);
            println!("sim_ipc                  {:.4}", self.ipc());
            println!("insts_fetched            {}", self.instructions_fetched);
            println!("insts_renamed            {}", self.instructions_renamed);
            println!("insts_squashed           {}", self.instructions_squashed);
            println!("----------------------------------------------------------");
        }
        if want("instruction_mix") {
            println!("INSTRUCTION MIX");
            for (name, n) in [
                ("op.int", self.committed_integer),
                ("op.fp", self.committed_float),
                ("op.branch", self.committed_branch),
                ("op.load", self.committed_load),
                ("op.store", self.committed_store),
            ] {
                println!("  {name:<22} {n} ({:.2}%)", pct(n, committed));
            }
            println!("----------------------------------------------------------");
        }
        if want("branch") {
            println!("BRANCH PREDICTION");
            println!("  bp.resolved            {}", self.branches_resolved);
            println!("  bp.mispredicts         {}", self.branch_mispredictions);
            println!("  bp.accuracy            {:.2}%", self.branch_accuracy());
            println!("  flushes                {}", self.flushes);
            println!("----------------------------------------------------------");
        }
        if want("memory") {
            println!("MEMORY");
            println!("  mem.reads              {}", self.memory_reads);
            println!("  mem.writes             {}", self.memory_writes);
            println!("  loads.forwarded        {}", self.loads_forwarded);
            println!("  loads.hazards          {}", self.memory_hazards);
            if self.cache_hits + self.cache_misses > 0 {
                println!("  cache.hits             {}", self.cache_hits);
                println!("  cache.misses           {}", self.cache_misses);
                println!("  cache.hit_rate         {:.2}%", self.cache_hit_rate());
            }
            println!("----------------------------------------------------------");
        }
        if want("stalls") {
            println!("STALLS");
            for (name, n) in [
                ("stalls.rename", self.stalls_rename),
                ("stalls.rob", self.stalls_rob),
                ("stalls.buffer", self.stalls_buffer),
            ] {
                println!("  {name:<22} {n} ({:.2}%)", pct(n, cyc));
            }
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
