//! Per-kind semantics. Each kind maps to exactly one handler.

use vliw_core::{Reg, Result, Value, VliwError};

use crate::catalog::OpKind;
use crate::program::Instruction;

use super::Executor;

pub(super) type Handler = fn(&mut Executor<'_>, &Instruction) -> Result<()>;

pub(super) fn handler(kind: OpKind) -> Handler {
    match kind {
        OpKind::Load => load,
        OpKind::Store => store,
        OpKind::Add => add,
        OpKind::Sub => sub,
        OpKind::Mul => mul,
        OpKind::Div => div,
        OpKind::Move => mov,
        OpKind::Ftoi => ftoi,
        OpKind::Itof => itof,
        OpKind::Shr => shr,
    }
}

fn operand(instr: &Instruction, slot: Option<Reg>, name: &str) -> Result<Reg> {
    slot.ok_or_else(|| {
        VliwError::InvalidProgram(format!("{} without a {} operand", instr.kind, name))
    })
}

fn load(ex: &mut Executor<'_>, instr: &Instruction) -> Result<()> {
    let dest = operand(instr, instr.dest, "dest")?;
    let key = operand(instr, instr.src1, "src1")?;
    let value = ex.input(key)?;
    ex.file.set(dest, value);
    Ok(())
}

fn store(ex: &mut Executor<'_>, instr: &Instruction) -> Result<()> {
    let reg = operand(instr, instr.dest, "dest")?;
    let value = ex.read(reg)?;
    ex.file.emit(instr.label(), value);
    Ok(())
}

fn binary(
    ex: &mut Executor<'_>,
    instr: &Instruction,
    op: fn(Value, Value) -> Result<Value>,
) -> Result<()> {
    let dest = operand(instr, instr.dest, "dest")?;
    let lhs = ex.read(operand(instr, instr.src1, "src1")?)?;
    let rhs = ex.read(operand(instr, instr.src2, "src2")?)?;
    ex.file.set(dest, op(lhs, rhs)?);
    Ok(())
}

fn unary(ex: &mut Executor<'_>, instr: &Instruction, op: fn(Value) -> Result<Value>) -> Result<()> {
    let dest = operand(instr, instr.dest, "dest")?;
    let src = ex.read(operand(instr, instr.src1, "src1")?)?;
    ex.file.set(dest, op(src)?);
    Ok(())
}

fn add(ex: &mut Executor<'_>, instr: &Instruction) -> Result<()> {
    binary(ex, instr, Value::add)
}

fn sub(ex: &mut Executor<'_>, instr: &Instruction) -> Result<()> {
    binary(ex, instr, Value::sub)
}

fn mul(ex: &mut Executor<'_>, instr: &Instruction) -> Result<()> {
    binary(ex, instr, Value::mul)
}

fn div(ex: &mut Executor<'_>, instr: &Instruction) -> Result<()> {
    binary(ex, instr, Value::div)
}

fn mov(ex: &mut Executor<'_>, instr: &Instruction) -> Result<()> {
    unary(ex, instr, Ok)
}

fn ftoi(ex: &mut Executor<'_>, instr: &Instruction) -> Result<()> {
    unary(ex, instr, |v| Ok(v.f32_bits()))
}

fn itof(ex: &mut Executor<'_>, instr: &Instruction) -> Result<()> {
    unary(ex, instr, Value::from_f32_bits)
}

fn shr(ex: &mut Executor<'_>, instr: &Instruction) -> Result<()> {
    unary(ex, instr, Value::shr1)
}
