use vliw_core::Result;

use crate::catalog::OpKind;
use crate::program::Program;

use super::{inputs, DemoProgram, Expected};

/// A strictly serial chain mixing cheap and size-weighted operations.
/// R3 and R6 are never loaded; they are read straight from the inputs.
pub fn latency_chain() -> Result<DemoProgram> {
    let program = Program::builder()
        .load("R1", "input0", 16)
        .binary(OpKind::Add, "R2", "R1", "R3", 1)
        .unary(OpKind::Move, "R4", "R2", 32)
        .binary(OpKind::Mul, "R5", "R4", "R6", 1)
        .store("R5", 16)
        .build()?;

    Ok(DemoProgram {
        name: "latency-chain",
        description: "(input0 + R3) * R6 through a size-weighted MOVE",
        program,
        inputs: inputs(&[("input0", 2i64), ("R3", 5), ("R6", 4)]),
        expected: vec![Expected::output(28.0)],
        tolerance: 0.0,
    })
}
