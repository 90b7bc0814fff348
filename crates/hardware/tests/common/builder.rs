use ooosim_core::isa::{Arg, Line, OpKind, Program, StaticInstruction};

/// Fluent program construction.
///
/// Arguments that parse as integers become immediates; everything else is a
/// register or label name.
#[derive(Default)]
pub struct ProgramBuilder {
    lines: Vec<Line>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ins(mut self, op: OpKind, args: &[&str]) -> Self {
        let args = args
            .iter()
            .map(|a| a.parse::<i64>().map_or_else(|_| Arg::Name((*a).to_string()), Arg::Int))
            .collect();
        self.lines
            .push(Line::Instruction(StaticInstruction::new(op, args).unwrap()));
        self
    }

    pub fn label(mut self, name: &str) -> Self {
        self.lines.push(Line::Label {
            label: name.to_string(),
        });
        self
    }

    pub fn build(self) -> Program {
        Program::new(self.lines).unwrap()
    }
}

/// `add x1 x2 x3`.
pub fn add_program() -> Program {
    ProgramBuilder::new()
        .ins(OpKind::Add, &["x1", "x2", "x3"])
        .build()
}

/// Countdown loop: three iterations of `subi`/`bne`, then a marker write.
pub fn loop_program() -> Program {
    ProgramBuilder::new()
        .ins(OpKind::Addi, &["x1", "x0", "3"])
        .label("loop")
        .ins(OpKind::Subi, &["x1", "x1", "1"])
        .ins(OpKind::Bne, &["x1", "x0", "loop"])
        .ins(OpKind::Addi, &["x5", "x0", "9"])
        .build()
}

/// A mix of arithmetic, memory and control flow for whole-state checks.
pub fn mixed_program() -> Program {
    ProgramBuilder::new()
        .ins(OpKind::Add, &["x1", "x2", "x3"])
        .ins(OpKind::Sw, &["x1", "x2", "0"])
        .ins(OpKind::Lw, &["x5", "x2", "0"])
        .ins(OpKind::Addi, &["x6", "x0", "2"])
        .label("again")
        .ins(OpKind::Subi, &["x6", "x6", "1"])
        .ins(OpKind::Fadd, &["f6", "f1", "f2"])
        .ins(OpKind::Bne, &["x6", "x0", "again"])
        .ins(OpKind::Jal, &["x7", "done"])
        .ins(OpKind::Addi, &["x8", "x0", "1"])
        .label("done")
        .ins(OpKind::Add, &["x9", "x5", "x1"])
        .build()
}
