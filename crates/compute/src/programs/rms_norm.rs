//! RMS normalisation of a 3-element vector, unrolled into straight-line
//! code. Two variants differ only in how `1 / sqrt(mean(x^2) + epsilon)` is
//! obtained.

use vliw_core::{Result, Value};

use crate::catalog::OpKind::{Add, Div, Ftoi, Itof, Mul, Move, Shr, Sub};
use crate::program::{Inputs, Program, ProgramBuilder};
use crate::reference::{self, FAST_INV_SQRT_MAGIC};

use super::{DemoProgram, Expected};

pub const RMS_X: [f64; 3] = [3.0, 4.0, 5.0];
pub const RMS_GAMMA: [f64; 3] = [0.1, 0.2, 0.3];
pub const RMS_EPSILON: f64 = 1e-8;

const LABELS: [&str; 3] = ["norm0", "norm1", "norm2"];

fn base_inputs() -> Inputs {
    let mut inputs = Inputs::new();
    for (i, (x, g)) in RMS_X.iter().zip(RMS_GAMMA).enumerate() {
        inputs.insert(format!("x{}", i), Value::Float(*x));
        inputs.insert(format!("gamma{}", i), Value::Float(g));
    }
    inputs.insert("epsilon".to_string(), Value::Float(RMS_EPSILON));
    inputs.insert("const0".to_string(), Value::Float(3.0));
    inputs.insert("const1".to_string(), Value::Float(0.5));
    inputs
}

/// Loads R1..R9 and computes `n = mean(x^2) + epsilon` into R16.
fn mean_square(builder: ProgramBuilder) -> ProgramBuilder {
    builder
        .load("R1", "x0", 16)
        .load("R2", "x1", 16)
        .load("R3", "x2", 16)
        .load("R4", "gamma0", 16)
        .load("R5", "gamma1", 16)
        .load("R6", "gamma2", 16)
        .load("R7", "epsilon", 16)
        .load("R8", "const0", 16)
        .load("R9", "const1", 16)
        .binary(Mul, "R10", "R1", "R1", 1)
        .binary(Mul, "R11", "R2", "R2", 1)
        .binary(Mul, "R12", "R3", "R3", 1)
        .binary(Add, "R13", "R10", "R11", 1)
        .binary(Add, "R14", "R13", "R12", 1)
        .binary(Div, "R15", "R14", "R8", 1)
        .binary(Add, "R16", "R15", "R7", 1)
}

fn expected(values: Vec<f64>) -> Vec<Expected> {
    LABELS
        .iter()
        .zip(values)
        .map(|(label, v)| Expected::channel(label, v))
        .collect()
}

/// Square root by five unrolled Newton steps, then `x[i] / rms * gamma[i]`.
pub fn rms_norm_newton() -> Result<DemoProgram> {
    let mut builder = mean_square(Program::builder()).unary(Move, "R17", "R16", 0);

    // s_{k+1} = 0.5 * (s_k + n / s_k), starting from s_0 = n in R17.
    let mut s = 17;
    for _ in 0..reference::NEWTON_ITERATIONS {
        let (q, sum, next) = (s + 1, s + 2, s + 3);
        builder = builder
            .binary(Div, &format!("R{}", q), "R16", &format!("R{}", s), 1)
            .binary(Add, &format!("R{}", sum), &format!("R{}", s), &format!("R{}", q), 1)
            .binary(Mul, &format!("R{}", next), "R9", &format!("R{}", sum), 1);
        s = next;
    }

    let program = builder
        .unary(Move, "R33", &format!("R{}", s), 0)
        .binary(Div, "R34", "R1", "R33", 1)
        .binary(Mul, "R35", "R34", "R4", 1)
        .binary(Div, "R36", "R2", "R33", 1)
        .binary(Mul, "R37", "R36", "R5", 1)
        .binary(Div, "R38", "R3", "R33", 1)
        .binary(Mul, "R39", "R38", "R6", 1)
        .store_as("R35", "norm0", 1)
        .store_as("R37", "norm1", 1)
        .store_as("R39", "norm2", 1)
        .build()?;

    Ok(DemoProgram {
        name: "rms-newton",
        description: "RMS norm of [3, 4, 5] with a Newton square root",
        program,
        inputs: base_inputs(),
        expected: expected(reference::rms_norm(&RMS_X, &RMS_GAMMA, RMS_EPSILON)?),
        tolerance: 1e-6,
    })
}

/// Reciprocal square root by the binary32 bit trick and one Newton step,
/// then `x[i] * inv * gamma[i]`.
pub fn rms_norm_fast_inv_sqrt() -> Result<DemoProgram> {
    let program = mean_square(Program::builder())
        .load("R17", "magic", 16)
        .load("R18", "const2", 16)
        .binary(Mul, "R19", "R16", "R9", 1)
        .unary(Ftoi, "R20", "R16", 0)
        .unary(Shr, "R21", "R20", 1)
        .binary(Sub, "R22", "R17", "R21", 1)
        .unary(Itof, "R23", "R22", 0)
        .binary(Mul, "R24", "R23", "R23", 1)
        .binary(Mul, "R25", "R19", "R24", 1)
        .binary(Sub, "R26", "R18", "R25", 1)
        .binary(Mul, "R27", "R23", "R26", 1)
        .binary(Mul, "R28", "R1", "R27", 1)
        .binary(Mul, "R29", "R28", "R4", 1)
        .binary(Mul, "R30", "R2", "R27", 1)
        .binary(Mul, "R31", "R30", "R5", 1)
        .binary(Mul, "R32", "R3", "R27", 1)
        .binary(Mul, "R33", "R32", "R6", 1)
        .store_as("R29", "norm0", 1)
        .store_as("R31", "norm1", 1)
        .store_as("R33", "norm2", 1)
        .build()?;

    let mut inputs = base_inputs();
    inputs.insert("magic".to_string(), Value::Int(i64::from(FAST_INV_SQRT_MAGIC)));
    inputs.insert("const2".to_string(), Value::Float(1.5));

    Ok(DemoProgram {
        name: "rms-fast",
        description: "RMS norm of [3, 4, 5] with the fast inverse square root",
        program,
        inputs,
        expected: expected(reference::rms_norm_fast_inv_sqrt(&RMS_X, &RMS_GAMMA, RMS_EPSILON)?),
        tolerance: 1e-12,
    })
}
