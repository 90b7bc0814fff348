//! Operation Tests.
//!
//! Runs single instructions through the whole pipeline against the
//! reference register values (`x2=25 x3=6 x4=-2`).

use crate::common::builder::ProgramBuilder;
use crate::common::harness::TestContext;
use ooosim_core::isa::OpKind;
use rstest::rstest;

fn run_one(op: OpKind, args: &[&str]) -> TestContext {
    let program = ProgramBuilder::new().ins(op, args).build();
    let mut ctx = TestContext::new(program);
    ctx.run_to_end();
    ctx
}

#[rstest]
#[case::add(OpKind::Add, &["x1", "x2", "x3"], 31)]
#[case::sub(OpKind::Sub, &["x1", "x3", "x2"], -19)]
#[case::mul(OpKind::Mul, &["x1", "x2", "x4"], -50)]
#[case::div_truncates(OpKind::Div, &["x1", "x2", "x4"], -12)]
#[case::div_by_zero(OpKind::Div, &["x1", "x2", "x0"], -1)]
#[case::rem(OpKind::Rem, &["x1", "x2", "x3"], 1)]
#[case::and(OpKind::And, &["x1", "x2", "x3"], 25 & 6)]
#[case::xor(OpKind::Xor, &["x1", "x2", "x3"], 25 ^ 6)]
#[case::sll(OpKind::Sll, &["x1", "x3", "x3"], 6 << 6)]
#[case::sra(OpKind::Sra, &["x1", "x4", "x3"], -1)]
#[case::slt(OpKind::Slt, &["x1", "x4", "x3"], 1)]
#[case::sltu(OpKind::Sltu, &["x1", "x4", "x3"], 0)]
#[case::addi(OpKind::Addi, &["x1", "x4", "5"], 3)]
#[case::subi(OpKind::Subi, &["x1", "x2", "30"], -5)]
#[case::slti(OpKind::Slti, &["x1", "x2", "26"], 1)]
#[case::lui(OpKind::Lui, &["x1", "2"], 8192)]
fn test_integer_operation(#[case] op: OpKind, #[case] args: &[&str], #[case] expected: i64) {
    let ctx = run_one(op, args);
    assert_eq!(ctx.reg("x1"), expected, "{op:?}");
}

#[rstest]
#[case::fadd(OpKind::Fadd, 5.5 + 3.125)]
#[case::fsub(OpKind::Fsub, 5.5 - 3.125)]
#[case::fmul(OpKind::Fmul, 5.5 * 3.125)]
#[case::fdiv(OpKind::Fdiv, 5.5 / 3.125)]
fn test_float_operation(#[case] op: OpKind, #[case] expected: f64) {
    let ctx = run_one(op, &["f6", "f1", "f2"]);
    assert!((ctx.fp("f6") - expected).abs() < 1e-12, "{op:?}");
}

#[rstest]
#[case::beq_taken(OpKind::Beq, &["x2", "x2"], true)]
#[case::bne_not_taken(OpKind::Bne, &["x2", "x2"], false)]
#[case::blt_signed(OpKind::Blt, &["x4", "x3"], true)]
#[case::bltu_unsigned(OpKind::Bltu, &["x4", "x3"], false)]
#[case::bge(OpKind::Bge, &["x2", "x3"], true)]
#[case::bgeu(OpKind::Bgeu, &["x3", "x4"], false)]
fn test_branch_direction(#[case] op: OpKind, #[case] operands: &[&str], #[case] taken: bool) {
    let program = ProgramBuilder::new()
        .ins(op, &[operands[0], operands[1], "skip"])
        .ins(OpKind::Addi, &["x1", "x0", "1"])
        .label("skip")
        .ins(OpKind::Addi, &["x5", "x0", "1"])
        .build();
    let mut ctx = TestContext::new(program);
    ctx.run_to_end();
    assert_eq!(ctx.reg("x1"), i64::from(!taken), "{op:?}");
    assert_eq!(ctx.reg("x5"), 1);
}
