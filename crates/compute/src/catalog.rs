//! Operation catalog: the closed set of operation kinds, the role each
//! operand slot plays for a kind, and the latency model.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vliw_core::config::{LatencyConfig, DEFAULT_BASE_LATENCY, DEFAULT_SIZE_QUANTUM};
use vliw_core::VliwError;

/// Operation kinds understood by the scheduler and executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OpKind {
    /// `dest <- inputs[src1]`
    Load,
    /// Reads the register named by `dest` and writes the output sentinel.
    Store,
    Add,
    Sub,
    Mul,
    /// True division; always yields a float.
    Div,
    Move,
    /// Float to binary32 bit pattern.
    Ftoi,
    /// Binary32 bit pattern to float.
    Itof,
    /// Arithmetic shift right by one.
    Shr,
}

impl OpKind {
    pub const ALL: [OpKind; 10] = [
        OpKind::Load,
        OpKind::Store,
        OpKind::Add,
        OpKind::Sub,
        OpKind::Mul,
        OpKind::Div,
        OpKind::Move,
        OpKind::Ftoi,
        OpKind::Itof,
        OpKind::Shr,
    ];

    pub fn code(self) -> &'static str {
        match self {
            OpKind::Load => "LOAD",
            OpKind::Store => "STORE",
            OpKind::Add => "ADD",
            OpKind::Sub => "SUB",
            OpKind::Mul => "MUL",
            OpKind::Div => "DIV",
            OpKind::Move => "MOVE",
            OpKind::Ftoi => "FTOI",
            OpKind::Itof => "ITOF",
            OpKind::Shr => "SHR",
        }
    }

    /// Meaning of each slot of the `(op, dest, src1, src2, size)` record.
    pub fn roles(self) -> OperandRoles {
        use SrcRole::*;
        match self {
            OpKind::Load => OperandRoles::new(DestRole::Written, InputKey, Unused),
            OpKind::Store => OperandRoles::new(DestRole::Read, Label, Unused),
            OpKind::Add | OpKind::Sub | OpKind::Mul | OpKind::Div => {
                OperandRoles::new(DestRole::Written, Register, Register)
            }
            OpKind::Move | OpKind::Ftoi | OpKind::Itof | OpKind::Shr => {
                OperandRoles::new(DestRole::Written, Register, Unused)
            }
        }
    }

    /// Whether the kind is a sink (its `dest` slot is read, not written).
    pub fn is_sink(self) -> bool {
        self.roles().dest == DestRole::Read
    }

    /// Catalog base latency before any configuration override.
    pub fn catalog_latency(self) -> u32 {
        match self {
            OpKind::Add | OpKind::Sub => 1,
            OpKind::Mul | OpKind::Div => 2,
            OpKind::Move | OpKind::Load | OpKind::Store => 3,
            OpKind::Ftoi | OpKind::Itof | OpKind::Shr => 3,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for OpKind {
    type Err = VliwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        OpKind::ALL
            .iter()
            .copied()
            .find(|k| k.code() == upper)
            .ok_or_else(|| VliwError::UnknownOperation(s.to_string()))
    }
}

// ── Operand roles ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestRole {
    /// The instruction writes this register.
    Written,
    /// Sink kinds: the instruction reads this register.
    Read,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SrcRole {
    /// Slot must be absent.
    Unused,
    /// A register read by the instruction.
    Register,
    /// Key into the caller's input environment. Counts as a read of an
    /// external register for scheduling purposes.
    InputKey,
    /// Optional output channel name for sinks. Not a register.
    Label,
}

impl SrcRole {
    pub fn is_read(self) -> bool {
        matches!(self, SrcRole::Register | SrcRole::InputKey)
    }

    pub fn is_required(self) -> bool {
        self.is_read()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandRoles {
    pub dest: DestRole,
    pub src1: SrcRole,
    pub src2: SrcRole,
}

impl OperandRoles {
    const fn new(dest: DestRole, src1: SrcRole, src2: SrcRole) -> Self {
        Self { dest, src1, src2 }
    }

    /// Number of register reads the kind performs.
    pub fn arity(&self) -> usize {
        let from_dest = usize::from(self.dest == DestRole::Read);
        from_dest + usize::from(self.src1.is_read()) + usize::from(self.src2.is_read())
    }
}

// ── Latency model ─────────────────────────────────────────────

fn default_size_quantum() -> u32 { DEFAULT_SIZE_QUANTUM }
fn default_base() -> u32 { DEFAULT_BASE_LATENCY }

fn default_table() -> BTreeMap<OpKind, u32> {
    OpKind::ALL
        .iter()
        .map(|k| (*k, k.catalog_latency()))
        .collect()
}

/// `latency(kind, size) = base(kind) + size / size_quantum`.
///
/// Kinds missing from `base` fall back to `default_base`. Serialized with op
/// codes as keys so it can live in a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LatencyTable", into = "LatencyTable")]
pub struct LatencyModel {
    pub size_quantum: u32,
    pub default_base: u32,
    pub base: BTreeMap<OpKind, u32>,
}

impl Default for LatencyModel {
    fn default() -> Self {
        Self {
            size_quantum: default_size_quantum(),
            default_base: default_base(),
            base: default_table(),
        }
    }
}

impl LatencyModel {
    /// Catalog table with the scalar knobs taken from environment config.
    pub fn from_config(config: &LatencyConfig) -> Self {
        Self {
            size_quantum: config.size_quantum,
            default_base: config.default_base,
            base: default_table(),
        }
    }

    pub fn base_latency(&self, kind: OpKind) -> u32 {
        self.base.get(&kind).copied().unwrap_or(self.default_base)
    }

    pub fn latency(&self, kind: OpKind, size: u32) -> u32 {
        let extra = if self.size_quantum == 0 { 0 } else { size / self.size_quantum };
        self.base_latency(kind) + extra
    }
}

/// Wire form of [`LatencyModel`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LatencyTable {
    #[serde(default = "default_size_quantum")]
    size_quantum: u32,
    #[serde(default = "default_base")]
    default_base: u32,
    #[serde(default)]
    base: Option<BTreeMap<String, u32>>,
}

impl TryFrom<LatencyTable> for LatencyModel {
    type Error = VliwError;

    fn try_from(table: LatencyTable) -> Result<Self, Self::Error> {
        let base = match table.base {
            None => default_table(),
            Some(entries) => entries
                .into_iter()
                .map(|(code, cycles)| code.parse::<OpKind>().map(|kind| (kind, cycles)))
                .collect::<Result<BTreeMap<_, _>, VliwError>>()?,
        };
        Ok(Self {
            size_quantum: table.size_quantum,
            default_base: table.default_base,
            base,
        })
    }
}

impl From<LatencyModel> for LatencyTable {
    fn from(model: LatencyModel) -> Self {
        Self {
            size_quantum: model.size_quantum,
            default_base: model.default_base,
            base: Some(
                model
                    .base
                    .into_iter()
                    .map(|(k, v)| (k.code().to_string(), v))
                    .collect(),
            ),
        }
    }
}
