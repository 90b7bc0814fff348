use ooosim_core::config::{Config, RegisterConfig};
use ooosim_core::core::CpuState;
use ooosim_core::core::arch::Readiness;
use ooosim_core::{Program, Simulator};

/// Upper bound for runs that are expected to drain.
pub const MAX_CYCLES: u64 = 1_000;

#[derive(Debug)]
pub struct TestContext {
    pub sim: Simulator,
}

impl TestContext {
    /// The reference setup: default units and widths, `x2=25 x3=6 x4=-2`,
    /// and a few float values.
    pub fn reference_config() -> Config {
        let mut registers = RegisterConfig::default();
        for (name, value) in [("x2", 25), ("x3", 6), ("x4", -2)] {
            let _ = registers.integer.insert(name.to_string(), value);
        }
        for (name, value) in [("f1", 5.5), ("f2", 3.125), ("f3", -1.5), ("f4", 2.0), ("f5", 0.25)] {
            let _ = registers.float.insert(name.to_string(), value);
        }
        Config {
            registers,
            ..Config::default()
        }
    }

    pub fn new(program: Program) -> Self {
        Self::with_config(Self::reference_config(), program)
    }

    pub fn with_config(config: Config, program: Program) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        Self {
            sim: Simulator::new(config, program).unwrap(),
        }
    }

    pub fn state(&self) -> &CpuState {
        self.sim.state()
    }

    pub fn step(&mut self, n: u64) {
        self.sim.step_n(n);
    }

    pub fn back(&mut self, n: u64) {
        self.sim.step_back_n(n).unwrap();
    }

    /// Runs until the program drains, panicking if it does not.
    pub fn run_to_end(&mut self) {
        let _ = self.cycles_to_end();
    }

    /// As [`run_to_end`](Self::run_to_end), returning the cycles stepped.
    pub fn cycles_to_end(&mut self) -> u64 {
        let cycles = self.sim.run(MAX_CYCLES);
        assert!(self.sim.is_finished(), "program did not drain in {MAX_CYCLES} cycles");
        cycles
    }

    pub fn reg(&self, name: &str) -> i64 {
        self.state().read_register(name).unwrap()
    }

    pub fn fp(&self, name: &str) -> f64 {
        self.state().register(name).unwrap().as_f64()
    }

    pub fn readiness(&self, name: &str) -> Readiness {
        self.state().register(name).unwrap().readiness
    }
}
