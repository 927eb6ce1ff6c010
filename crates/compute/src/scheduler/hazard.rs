use std::collections::HashSet;
use std::fmt;

use vliw_core::{Reg, RegisterTable};

use crate::program::Instruction;

/// A forbidden same-bundle ordering between two instructions sharing a
/// register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hazard {
    /// Candidate reads a register a bundle-mate writes.
    ReadAfterWrite(Reg),
    /// Candidate writes a register a bundle-mate writes.
    WriteAfterWrite(Reg),
    /// Candidate writes a register a bundle-mate reads.
    WriteAfterRead(Reg),
}

impl Hazard {
    pub fn register(self) -> Reg {
        match self {
            Hazard::ReadAfterWrite(r) | Hazard::WriteAfterWrite(r) | Hazard::WriteAfterRead(r) => r,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Hazard::ReadAfterWrite(_) => "RAW",
            Hazard::WriteAfterWrite(_) => "WAW",
            Hazard::WriteAfterRead(_) => "WAR",
        }
    }

    pub fn describe(self, table: &RegisterTable) -> String {
        format!("{} on {}", self.label(), table.name(self.register()))
    }
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.label(), self.register())
    }
}

/// Registers read and written by the instructions already in a bundle.
#[derive(Debug, Default, Clone)]
pub struct Footprint {
    reads: HashSet<Reg>,
    writes: HashSet<Reg>,
}

impl Footprint {
    pub fn new() -> Self {
        Self::default()
    }

    /// First hazard `instr` would introduce, if admitted.
    pub fn conflict(&self, instr: &Instruction) -> Option<Hazard> {
        if let Some(r) = instr.reads().find(|r| self.writes.contains(r)) {
            return Some(Hazard::ReadAfterWrite(r));
        }
        if let Some(dest) = instr.writes() {
            if self.writes.contains(&dest) {
                return Some(Hazard::WriteAfterWrite(dest));
            }
            if self.reads.contains(&dest) {
                return Some(Hazard::WriteAfterRead(dest));
            }
        }
        None
    }

    pub fn admit(&mut self, instr: &Instruction) {
        self.reads.extend(instr.reads());
        if let Some(dest) = instr.writes() {
            self.writes.insert(dest);
        }
    }
}
