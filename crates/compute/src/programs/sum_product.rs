use vliw_core::Result;

use crate::catalog::OpKind;
use crate::program::Program;

use super::{inputs, DemoProgram, Expected};

/// `(input0 + input1) * input2`
pub fn sum_product() -> Result<DemoProgram> {
    let program = Program::builder()
        .load("R1", "input0", 16)
        .load("R2", "input1", 16)
        .binary(OpKind::Add, "R3", "R1", "R2", 1)
        .load("R4", "input2", 16)
        .binary(OpKind::Mul, "R5", "R3", "R4", 1)
        .store("R5", 1)
        .build()?;

    Ok(DemoProgram {
        name: "sum-product",
        description: "(input0 + input1) * input2",
        program,
        inputs: inputs(&[("input0", 3i64), ("input1", 5), ("input2", 10)]),
        expected: vec![Expected::output(80.0)],
        tolerance: 0.0,
    })
}
