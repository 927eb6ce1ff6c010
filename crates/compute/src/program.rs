//! Program model: interned instructions, the 5-field record form they are
//! built from, and TOML program files.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use vliw_core::{Reg, RegisterTable, Result, Value, VliwError};

use crate::catalog::{DestRole, OpKind, SrcRole};

/// Caller-supplied values for external registers and LOAD keys.
pub type Inputs = IndexMap<String, Value>;

/// One operation. Identity is its position in the owning [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub kind: OpKind,
    pub dest: Option<Reg>,
    pub src1: Option<Reg>,
    pub src2: Option<Reg>,
    pub size: u32,
}

impl Instruction {
    /// The register this instruction writes. Sinks write none.
    pub fn writes(&self) -> Option<Reg> {
        match self.kind.roles().dest {
            DestRole::Written => self.dest,
            DestRole::Read => None,
        }
    }

    /// Registers this instruction reads, including a sink's `dest` slot and
    /// a LOAD's input key.
    pub fn reads(&self) -> impl Iterator<Item = Reg> {
        let roles = self.kind.roles();
        let from_dest = match roles.dest {
            DestRole::Read => self.dest,
            DestRole::Written => None,
        };
        let src1 = self.src1.filter(|_| roles.src1.is_read());
        let src2 = self.src2.filter(|_| roles.src2.is_read());
        [from_dest, src1, src2].into_iter().flatten()
    }

    /// Output channel name slot of a sink.
    pub fn label(&self) -> Option<Reg> {
        self.src1.filter(|_| self.kind.roles().src1 == SrcRole::Label)
    }

    /// Render as `OP dest, src1, src2 (size N)` with names resolved.
    pub fn render(&self, table: &RegisterTable) -> String {
        let mut out = self.kind.code().to_string();
        let operands: Vec<&str> = [self.dest, self.src1, self.src2]
            .into_iter()
            .flatten()
            .map(|r| table.name(r))
            .collect();
        if !operands.is_empty() {
            let _ = write!(out, " {}", operands.join(", "));
        }
        let _ = write!(out, " (size {})", self.size);
        out
    }
}

// ── Records ───────────────────────────────────────────────────

/// `(operation_kind, destination, source1, source2, size)`.
///
/// Absent operands are `None`; an empty string is never a valid operand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionRecord {
    pub op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src2: Option<String>,
    #[serde(default)]
    pub size: u32,
}

impl InstructionRecord {
    pub fn new(
        op: &str,
        dest: Option<&str>,
        src1: Option<&str>,
        src2: Option<&str>,
        size: u32,
    ) -> Self {
        Self {
            op: op.to_string(),
            dest: dest.map(str::to_string),
            src1: src1.map(str::to_string),
            src2: src2.map(str::to_string),
            size,
        }
    }
}

fn check_slot(
    position: usize,
    kind: OpKind,
    slot: &str,
    value: &Option<String>,
    required: bool,
    allowed: bool,
) -> Result<()> {
    match value {
        Some(name) if name.is_empty() => Err(VliwError::InvalidProgram(format!(
            "instruction {} ({}): {} is an empty name; use an absent operand instead",
            position, kind, slot
        ))),
        Some(name) if !allowed => Err(VliwError::InvalidProgram(format!(
            "instruction {} ({}): unexpected {} operand '{}'",
            position, kind, slot, name
        ))),
        None if required => Err(VliwError::InvalidProgram(format!(
            "instruction {} ({}): missing {} operand",
            position, kind, slot
        ))),
        _ => Ok(()),
    }
}

// ── Program ───────────────────────────────────────────────────

/// An ordered sequence of instructions. Order is a tie-break priority for
/// the scheduler, not a dependency order.
#[derive(Debug, Clone)]
pub struct Program {
    instructions: Vec<Instruction>,
    registers: Arc<RegisterTable>,
}

impl Program {
    pub fn builder() -> ProgramBuilder {
        ProgramBuilder::default()
    }

    /// Validate records against their kinds' operand roles and intern names.
    pub fn from_records(records: &[InstructionRecord]) -> Result<Self> {
        let mut table = RegisterTable::new();
        let mut instructions = Vec::with_capacity(records.len());

        for (position, record) in records.iter().enumerate() {
            let kind: OpKind = record.op.parse()?;
            let roles = kind.roles();

            check_slot(position, kind, "dest", &record.dest, true, true)?;
            check_slot(
                position,
                kind,
                "src1",
                &record.src1,
                roles.src1.is_required(),
                roles.src1 != SrcRole::Unused,
            )?;
            check_slot(
                position,
                kind,
                "src2",
                &record.src2,
                roles.src2.is_required(),
                roles.src2 != SrcRole::Unused,
            )?;

            let mut intern = |name: &Option<String>| name.as_deref().map(|n| table.intern(n));
            instructions.push(Instruction {
                kind,
                dest: intern(&record.dest),
                src1: intern(&record.src1),
                src2: intern(&record.src2),
                size: record.size,
            });
        }

        Ok(Self {
            instructions,
            registers: Arc::new(table),
        })
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn get(&self, position: usize) -> Option<&Instruction> {
        self.instructions.get(position)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn registers(&self) -> &Arc<RegisterTable> {
        &self.registers
    }

    /// Resolve a name to its key, if the program mentions it.
    pub fn reg(&self, name: &str) -> Option<Reg> {
        self.registers.lookup(name)
    }

    /// Back to the 5-field record form.
    pub fn to_records(&self) -> Vec<InstructionRecord> {
        let name = |r: Option<Reg>| r.map(|r| self.registers.name(r).to_string());
        self.instructions
            .iter()
            .map(|i| InstructionRecord {
                op: i.kind.code().to_string(),
                dest: name(i.dest),
                src1: name(i.src1),
                src2: name(i.src2),
                size: i.size,
            })
            .collect()
    }
}

/// Fluent construction of a [`Program`]. Validation happens in `build()`.
#[derive(Debug, Default, Clone)]
pub struct ProgramBuilder {
    records: Vec<InstructionRecord>,
}

impl ProgramBuilder {
    pub fn record(mut self, record: InstructionRecord) -> Self {
        self.records.push(record);
        self
    }

    /// `dest <- inputs[key]`
    pub fn load(self, dest: &str, key: &str, size: u32) -> Self {
        self.record(InstructionRecord::new("LOAD", Some(dest), Some(key), None, size))
    }

    /// Write `reg` to the output sentinel.
    pub fn store(self, reg: &str, size: u32) -> Self {
        self.record(InstructionRecord::new("STORE", Some(reg), None, None, size))
    }

    /// Write `reg` to the output sentinel and to the channel `label`.
    pub fn store_as(self, reg: &str, label: &str, size: u32) -> Self {
        self.record(InstructionRecord::new("STORE", Some(reg), Some(label), None, size))
    }

    pub fn binary(self, kind: OpKind, dest: &str, lhs: &str, rhs: &str, size: u32) -> Self {
        self.record(InstructionRecord::new(kind.code(), Some(dest), Some(lhs), Some(rhs), size))
    }

    pub fn unary(self, kind: OpKind, dest: &str, src: &str, size: u32) -> Self {
        self.record(InstructionRecord::new(kind.code(), Some(dest), Some(src), None, size))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn build(self) -> Result<Program> {
        Program::from_records(&self.records)
    }
}

// ── Program files ─────────────────────────────────────────────

/// TOML program file:
///
/// ```toml
/// [[instr]]
/// op = "LOAD"
/// dest = "R1"
/// src1 = "input0"
/// size = 16
///
/// [inputs]
/// input0 = 3
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramFile {
    #[serde(rename = "instr", default)]
    pub instructions: Vec<InstructionRecord>,
    #[serde(default)]
    pub inputs: Inputs,
}

impl ProgramFile {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| VliwError::Parse(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| VliwError::Parse(format!("{}: {}", path.display(), e)))
    }

    pub fn program(&self) -> Result<Program> {
        Program::from_records(&self.instructions)
    }
}
