//! Configuration and Program Files.

use crate::common::harness::TestContext;
use ooosim_core::config::{Config, Operation, PredictorKind, UnitClass};
use ooosim_core::{Program, Simulator};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_file_overrides_defaults() {
    let file = write_temp(
        r#"{
            "pipeline": {"fetch_width": 2, "rob_size": 16},
            "predictor": {"kind": "Static"},
            "registers": {"integer": {"x2": 40}}
        }"#,
    );
    let config = Config::from_path(file.path()).unwrap();
    assert_eq!(config.pipeline.fetch_width, 2);
    assert_eq!(config.pipeline.rob_size, 16);
    assert_eq!(config.pipeline.commit_width, 4);
    assert_eq!(config.predictor.kind, PredictorKind::Static);
    assert_eq!(config.registers.integer["x2"], 40);
    assert!(config.function_units.iter().any(|fu| fu.class == UnitClass::Memory));
}

#[test]
fn test_invalid_config_is_rejected() {
    let file = write_temp(r#"{"pipeline": {"rob_size": 0}}"#);
    assert!(Config::from_path(file.path()).is_err());
    assert!(Config::from_json("{not json").is_err());
    assert!(Config::from_path(std::path::Path::new("/nonexistent/config.json")).is_err());
}

#[test]
fn test_program_file_runs() {
    let file = write_temp(
        r#"{"code": [
            {"op": "add", "args": ["x1", "x2", "x3"]},
            {"op": "beq", "args": ["x0", "x0", "out"]},
            {"op": "addi", "args": ["x1", "x0", 0]},
            {"label": "out"},
            {"op": "sw", "args": ["x1", "x0", 8]}
        ]}"#,
    );
    let program = Program::from_path(file.path()).unwrap();
    assert_eq!(program.len(), 4);
    assert_eq!(program.label("out"), Some(12));

    let mut sim = Simulator::new(TestContext::reference_config(), program).unwrap();
    let _ = sim.run(500);
    assert!(sim.is_finished());
    assert_eq!(sim.state().read_register("x1").unwrap(), 31);
    assert_eq!(sim.state().memory_value(8, 4), 31);
}

#[test]
fn test_program_with_unknown_names_is_rejected() {
    assert!(Program::from_json(r#"{"code": [{"op": "jal", "args": ["x0", "nowhere"]}]}"#).is_err());
    let program =
        Program::from_json(r#"{"code": [{"op": "add", "args": ["x1", "y9", "x3"]}]}"#).unwrap();
    assert!(Simulator::new(Config::default(), program).is_err());
}

#[test]
fn test_program_needing_a_missing_unit_is_rejected() {
    let config = Config::from_json(
        r#"{"function_units": [
            {"name": "FX", "class": "Integer", "latency": 1, "operations": ["Addition"]},
            {"name": "BR", "class": "Branch", "latency": 1},
            {"name": "L/S", "class": "LoadStore", "latency": 1},
            {"name": "MEM", "class": "Memory", "latency": 0}
        ]}"#,
    )
    .unwrap();
    assert!(config.has_unit_for(UnitClass::Integer, Operation::Addition));
    assert!(!config.has_unit_for(UnitClass::Integer, Operation::Multiplication));

    let mul = Program::from_json(r#"{"code": [{"op": "mul", "args": ["x1", "x2", "x3"]}]}"#)
        .unwrap();
    let err = Simulator::new(config.clone(), mul).unwrap_err();
    assert!(err.to_string().contains("mul"));

    let fadd = Program::from_json(r#"{"code": [{"op": "fadd", "args": ["f1", "f2", "f3"]}]}"#)
        .unwrap();
    assert!(Simulator::new(config.clone(), fadd).is_err());

    let add = Program::from_json(r#"{"code": [{"op": "add", "args": ["x1", "x2", "x3"]}]}"#)
        .unwrap();
    assert!(Simulator::new(config, add).is_ok());
}
