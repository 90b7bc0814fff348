use mockall::mock;
use ooosim_core::core::units::bru::{BranchPredictor, Prediction};

mock! {
    pub Predictor {}
    impl BranchPredictor for Predictor {
        fn predict(&self, pc: u64, unconditional: bool) -> Prediction;
        fn speculate(&mut self, taken: bool);
        fn history(&self) -> u64;
        fn restore_history(&mut self, history: u64);
        fn update(&mut self, pc: u64, history: u64, taken: bool, target: u64);
    }
}
