pub mod builder;
pub mod harness;
pub mod mocks;
