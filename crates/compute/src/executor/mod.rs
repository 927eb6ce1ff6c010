//! Deterministic replay of a [`Schedule`] against an input environment.
//!
//! Bundles run strictly in schedule order and instructions in bundle order.
//! Timing is not re-checked; the scheduler already enforced it. The
//! simulated cycle count is re-derived from bundle start cycles and
//! latencies.

mod ops;
mod register_file;

use std::time::Instant;

use tracing::{debug, info};
use vliw_core::{Reg, Result, Value, VliwError};

use crate::program::Inputs;
use crate::scheduler::Schedule;

pub use register_file::{ExecutionReport, RegisterFile};

pub struct Executor<'s> {
    schedule: &'s Schedule,
    inputs: &'s Inputs,
    file: RegisterFile,
}

impl<'s> Executor<'s> {
    pub fn new(schedule: &'s Schedule, inputs: &'s Inputs) -> Self {
        Self {
            schedule,
            inputs,
            file: RegisterFile::new(schedule.registers().clone()),
        }
    }

    /// Execute every bundle and return the final register file.
    pub fn run(mut self) -> Result<RegisterFile> {
        let start = Instant::now();
        let schedule = self.schedule;
        let registers = schedule.registers();
        let mut cycles = 0u64;

        for bundle in schedule.bundles() {
            cycles = cycles.max(bundle.start_cycle) + u64::from(bundle.latency());
            debug!(
                cycle = bundle.start_cycle,
                size = bundle.len(),
                "executing bundle"
            );
            for slot in &bundle.slots {
                debug!(
                    position = slot.position,
                    instr = %slot.instruction.render(registers),
                    "execute"
                );
                ops::handler(slot.instruction.kind)(&mut self, &slot.instruction)?;
            }
        }

        self.file.set_cycles(cycles);
        info!(
            bundles = schedule.len(),
            cycles,
            output = ?self.file.output(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "execution complete"
        );
        Ok(self.file)
    }

    /// Current value of `reg`: written registers first, then external
    /// registers from the inputs.
    fn read(&self, reg: Reg) -> Result<Value> {
        if let Some(value) = self.file.get_reg(reg) {
            return Ok(value);
        }
        if self.schedule.is_external(reg) {
            return self.input(reg);
        }
        Err(VliwError::UnwrittenRegister(
            self.schedule.registers().name(reg).to_string(),
        ))
    }

    fn input(&self, key: Reg) -> Result<Value> {
        let name = self.schedule.registers().name(key);
        self.inputs
            .get(name)
            .copied()
            .ok_or_else(|| VliwError::MissingInput(name.to_string()))
    }
}

/// Replay `schedule` once against `inputs`.
pub fn replay(schedule: &Schedule, inputs: &Inputs) -> Result<RegisterFile> {
    Executor::new(schedule, inputs).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::OpKind;
    use crate::program::Program;
    use crate::scheduler::{BundleScheduler, SchedulerConfig};

    fn schedule(program: &Program, width: usize) -> Schedule {
        BundleScheduler::new(program, SchedulerConfig::with_width(width))
            .unwrap()
            .run()
            .unwrap()
    }

    fn inputs(pairs: &[(&str, Value)]) -> Inputs {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn sum_product() -> Program {
        Program::builder()
            .load("R1", "input0", 16)
            .load("R2", "input1", 16)
            .binary(OpKind::Add, "R3", "R1", "R2", 1)
            .load("R4", "input2", 16)
            .binary(OpKind::Mul, "R5", "R3", "R4", 1)
            .store("R5", 1)
            .build()
            .unwrap()
    }

    #[test]
    fn sum_product_outputs_eighty() {
        let program = sum_product();
        let env = inputs(&[
            ("input0", Value::Int(3)),
            ("input1", Value::Int(5)),
            ("input2", Value::Int(10)),
        ]);
        for width in [1, 2, 4, 50] {
            let file = replay(&schedule(&program, width), &env).unwrap();
            assert_eq!(file.output(), Some(Value::Int(80)), "width {}", width);
            assert_eq!(file.get("R3"), Some(Value::Int(8)));
        }
    }

    #[test]
    fn missing_input_is_reported() {
        let program = sum_product();
        let env = inputs(&[("input0", Value::Int(3)), ("input1", Value::Int(5))]);
        let err = replay(&schedule(&program, 2), &env).unwrap_err();
        assert!(matches!(err, VliwError::MissingInput(name) if name == "input2"));
    }

    #[test]
    fn external_register_is_read_from_inputs() {
        let program = Program::builder()
            .load("R1", "in", 0)
            .binary(OpKind::Sub, "R2", "R1", "bias", 0)
            .store_as("R2", "delta", 0)
            .build()
            .unwrap();
        let env = inputs(&[("in", Value::Float(2.5)), ("bias", Value::Int(1))]);
        let file = replay(&schedule(&program, 2), &env).unwrap();
        assert_eq!(file.output_named("delta"), Some(Value::Float(1.5)));
        // Read-only externals are not copied into the register file.
        assert_eq!(file.get("bias"), None);
    }

    #[test]
    fn out_of_order_replay_hits_unwritten_register() {
        let program = sum_product();
        let mut schedule = schedule(&program, 4);
        schedule.bundles.reverse();
        let env = inputs(&[
            ("input0", Value::Int(3)),
            ("input1", Value::Int(5)),
            ("input2", Value::Int(10)),
        ]);
        let err = replay(&schedule, &env).unwrap_err();
        assert!(matches!(err, VliwError::UnwrittenRegister(name) if name == "R5"));
    }

    #[test]
    fn float_bit_casts_round_trip() {
        let program = Program::builder()
            .load("R1", "x", 0)
            .unary(OpKind::Ftoi, "R2", "R1", 0)
            .unary(OpKind::Shr, "R3", "R2", 0)
            .unary(OpKind::Itof, "R4", "R2", 0)
            .store("R4", 0)
            .build()
            .unwrap();
        let file = replay(&schedule(&program, 2), &inputs(&[("x", Value::Float(1.0))])).unwrap();
        assert_eq!(file.get("R2"), Some(Value::Int(0x3F80_0000)));
        assert_eq!(file.get("R3"), Some(Value::Int(0x1FC0_0000)));
        assert_eq!(file.output(), Some(Value::Float(1.0)));
    }

    #[test]
    fn arithmetic_errors_propagate() {
        let div = Program::builder()
            .binary(OpKind::Div, "R1", "a", "b", 0)
            .build()
            .unwrap();
        let err = replay(
            &schedule(&div, 1),
            &inputs(&[("a", Value::Int(1)), ("b", Value::Int(0))]),
        )
        .unwrap_err();
        assert!(matches!(err, VliwError::DivisionByZero(_)));

        let shr = Program::builder().unary(OpKind::Shr, "R1", "a", 0).build().unwrap();
        let err = replay(&schedule(&shr, 1), &inputs(&[("a", Value::Float(4.0))])).unwrap_err();
        assert!(matches!(err, VliwError::TypeMismatch { .. }));
    }

    #[test]
    fn cycles_follow_bundle_latencies() {
        let program = Program::builder()
            .load("R1", "in", 16)
            .binary(OpKind::Add, "R2", "R1", "R3", 1)
            .unary(OpKind::Move, "R4", "R2", 32)
            .binary(OpKind::Mul, "R5", "R4", "R6", 1)
            .store("R5", 16)
            .build()
            .unwrap();
        let env = inputs(&[
            ("in", Value::Int(2)),
            ("R3", Value::Int(5)),
            ("R6", Value::Int(4)),
        ]);
        let schedule = schedule(&program, 2);
        let file = replay(&schedule, &env).unwrap();
        assert_eq!(file.cycles(), 17);
        assert_eq!(file.cycles(), schedule.stats().makespan);
        assert_eq!(file.output(), Some(Value::Int(28)));
    }

    #[test]
    fn replay_is_repeatable() {
        let program = sum_product();
        let schedule = schedule(&program, 2);
        let env = inputs(&[
            ("input0", Value::Int(-4)),
            ("input1", Value::Float(0.5)),
            ("input2", Value::Int(3)),
        ]);
        let a = replay(&schedule, &env).unwrap();
        let b = replay(&schedule, &env).unwrap();
        assert_eq!(a.iter().collect::<Vec<_>>(), b.iter().collect::<Vec<_>>());
        assert_eq!(a.output(), Some(Value::Float(-10.5)));
    }
}
