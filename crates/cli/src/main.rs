//! Out-of-order core simulator CLI.
//!
//! This binary drives the `ooosim-core` library. It provides:
//! 1. **Run:** Execute a JSON program under an optional JSON configuration.
//! 2. **Demo:** Execute one of the built-in programs on the reference setup.
//! 3. **Rewind:** Step forward, step back, and check the state against a fresh run.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

use ooosim_core::common::Result;
use ooosim_core::config::{Config, RegisterConfig};
use ooosim_core::core::arch::RegisterKind;
use ooosim_core::{CpuState, Program, Simulator};

/// Cycle bound for `run` and `demo` when none is given.
const DEFAULT_CYCLES: u64 = 100_000;

#[derive(Parser, Debug)]
#[command(
    name = "ooosim",
    author,
    version,
    about = "Cycle-level superscalar out-of-order core simulator",
    long_about = "Run JSON instruction programs through a superscalar out-of-order core and step backwards through its history.\n\nExamples:\n  ooosim run --program prog.json --config core.json\n  ooosim demo store-load\n  ooosim rewind --program prog.json --forward 20 --back 5"
)]
struct Cli {
    /// Log pipeline events. `RUST_LOG` takes precedence when set.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a program to completion or until the cycle bound.
    Run {
        /// Program file (`{"code": [...]}`).
        #[arg(short, long)]
        program: PathBuf,

        /// Configuration file. Defaults apply when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum number of cycles to simulate.
        #[arg(long, default_value_t = DEFAULT_CYCLES)]
        cycles: u64,

        /// Print the final core state as JSON.
        #[arg(long)]
        dump_state: bool,
    },

    /// Run a built-in program on the reference setup.
    Demo {
        /// Program to run.
        #[arg(value_enum)]
        name: Demo,
    },

    /// Step forward, then back, and compare with a fresh run.
    Rewind {
        /// Program file (`{"code": [...]}`).
        #[arg(short, long)]
        program: PathBuf,

        /// Configuration file. Defaults apply when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Cycles to step forward.
        #[arg(long)]
        forward: u64,

        /// Cycles to step back.
        #[arg(long)]
        back: u64,
    },
}

/// Built-in programs.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum Demo {
    /// A single `add x1 x2 x3`.
    Add,
    /// Two adds with a read-after-write dependency.
    Raw,
    /// A store followed by a load from the same address.
    StoreLoad,
    /// A countdown loop closed by a conditional branch.
    Loop,
}

impl Demo {
    const fn source(self) -> &'static str {
        match self {
            Self::Add => r#"{"code": [
                {"op": "add", "args": ["x1", "x2", "x3"]}
            ]}"#,
            Self::Raw => r#"{"code": [
                {"op": "add", "args": ["x1", "x2", "x3"]},
                {"op": "add", "args": ["x4", "x1", "x2"]}
            ]}"#,
            Self::StoreLoad => r#"{"code": [
                {"op": "sw", "args": ["x3", "x2", 0]},
                {"op": "lw", "args": ["x5", "x2", 0]}
            ]}"#,
            Self::Loop => r#"{"code": [
                {"op": "addi", "args": ["x1", "x0", 3]},
                {"label": "loop"},
                {"op": "subi", "args": ["x1", "x1", 1]},
                {"op": "bne", "args": ["x1", "x0", "loop"]},
                {"op": "addi", "args": ["x5", "x0", 9]}
            ]}"#,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            program,
            config,
            cycles,
            dump_state,
        } => cmd_run(&program, config.as_deref(), cycles, dump_state),
        Commands::Demo { name } => cmd_demo(name),
        Commands::Rewind {
            program,
            config,
            forward,
            back,
        } => cmd_rewind(&program, config.as_deref(), forward, back),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let config = Config::from_path(path)?;
    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Default configuration with the register values the demos expect.
fn demo_config() -> Config {
    let mut registers = RegisterConfig::default();
    for (name, value) in [("x2", 25), ("x3", 6), ("x4", -2)] {
        let _ = registers.integer.insert(name.to_string(), value);
    }
    for (name, value) in [("f1", 5.5), ("f2", 3.125)] {
        let _ = registers.float.insert(name.to_string(), value);
    }
    Config {
        registers,
        ..Config::default()
    }
}

fn cmd_run(program: &Path, config: Option<&Path>, cycles: u64, dump_state: bool) -> Result<()> {
    let config = load_config(config)?;
    let program = Program::from_path(program)?;
    let mut sim = Simulator::new(config, program)?;
    let _ = sim.run(cycles);
    report(sim.state());
    if dump_state {
        println!("{}", serde_json::to_string_pretty(sim.state())?);
    }
    Ok(())
}

fn cmd_demo(demo: Demo) -> Result<()> {
    let program = Program::from_json(demo.source())?;
    println!("[*] Demo {demo:?}");
    for (index, ins) in program.instructions().iter().enumerate() {
        println!("    {:>4}  {ins}", index as u64 * ooosim_core::isa::INSTRUCTION_BYTES);
    }
    let mut sim = Simulator::new(demo_config(), program)?;
    let _ = sim.run(DEFAULT_CYCLES);
    report(sim.state());
    Ok(())
}

fn cmd_rewind(program: &Path, config: Option<&Path>, forward: u64, back: u64) -> Result<()> {
    let config = load_config(config)?;
    let program = Program::from_path(program)?;

    let mut sim = Simulator::new(config.clone(), program.clone())?;
    sim.step_n(forward);
    println!("[*] Stepped forward to cycle {}", sim.cycle());
    sim.step_back_n(back)?;
    println!("[*] Stepped back to cycle {}", sim.cycle());

    let mut fresh = Simulator::new(config, program)?;
    fresh.step_n(sim.cycle());
    if sim.state() == fresh.state() {
        println!("[*] State matches a fresh run of {} cycles", fresh.cycle());
        Ok(())
    } else {
        eprintln!("[!] State differs from a fresh run of {} cycles", fresh.cycle());
        process::exit(1);
    }
}

/// Prints non-zero architectural registers, unit occupancy and statistics.
fn report(state: &CpuState) {
    let status = if state.is_finished() { "finished" } else { "stopped" };
    println!("\n[*] {status} at cycle {}", state.cycle);
    println!("REGISTERS");
    for reg in state.registers.architectural() {
        match reg.kind {
            RegisterKind::Integer if reg.value != 0 => {
                println!("  {:<6} {}", reg.name, reg.as_i64());
            }
            RegisterKind::Float if reg.value != 0 => {
                println!("  {:<6} {}", reg.name, reg.as_f64());
            }
            _ => {}
        }
    }
    println!("UNITS");
    for unit in state.units.units() {
        println!("  {:<6} busy {} cycles", unit.config.name, unit.busy_cycles);
    }
    state.stats.print();
}
