//! Dependency analysis: which registers the program produces, which it
//! expects the caller to supply, and the availability table seeded from that.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;
use vliw_core::Reg;

use crate::program::Program;

/// Earliest cycle at which each register's value may be consumed.
///
/// Indexed by [`Reg`]; `None` means "not available yet" (conceptually
/// infinite).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityTable {
    cycles: Vec<Option<u64>>,
}

impl AvailabilityTable {
    pub fn new(registers: usize) -> Self {
        Self { cycles: vec![None; registers] }
    }

    pub fn get(&self, reg: Reg) -> Option<u64> {
        self.cycles.get(reg.index()).copied().flatten()
    }

    pub fn set(&mut self, reg: Reg, cycle: u64) {
        if reg.index() >= self.cycles.len() {
            self.cycles.resize(reg.index() + 1, None);
        }
        self.cycles[reg.index()] = Some(cycle);
    }

    /// Consumable at `cycle` iff availability <= `cycle`.
    pub fn is_ready(&self, reg: Reg, cycle: u64) -> bool {
        self.get(reg).is_some_and(|at| at <= cycle)
    }

    /// Registers with a known availability, in key order.
    pub fn entries(&self) -> impl Iterator<Item = (Reg, u64)> + '_ {
        self.cycles
            .iter()
            .enumerate()
            .filter_map(|(idx, at)| at.map(|c| (Reg::from_index(idx), c)))
    }
}

/// Result of classifying a program's registers.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    produced: HashSet<Reg>,
    external: HashSet<Reg>,
}

impl Analysis {
    /// Written by some non-sink instruction.
    pub fn produced(&self) -> &HashSet<Reg> {
        &self.produced
    }

    /// Read somewhere but never produced; expected from the caller.
    pub fn external(&self) -> &HashSet<Reg> {
        &self.external
    }

    pub fn is_external(&self, reg: Reg) -> bool {
        self.external.contains(&reg)
    }

    /// External registers sorted by key, for deterministic output.
    pub fn external_sorted(&self) -> Vec<Reg> {
        let mut regs: Vec<Reg> = self.external.iter().copied().collect();
        regs.sort();
        regs
    }

    /// Seed the availability table: external registers at cycle 0.
    ///
    /// With `supplied = Some(set)`, only external registers the caller
    /// actually supplies are seeded; the rest stay unavailable forever and
    /// surface as a scheduling failure.
    pub fn initial_availability(
        &self,
        registers: usize,
        supplied: Option<&HashSet<Reg>>,
    ) -> AvailabilityTable {
        let mut table = AvailabilityTable::new(registers);
        for reg in self.external_sorted() {
            if supplied.map_or(true, |s| s.contains(&reg)) {
                table.set(reg, 0);
            }
        }
        table
    }
}

/// Classifies registers as externally supplied or internally produced.
pub struct DependencyAnalyzer;

impl DependencyAnalyzer {
    pub fn analyze(program: &Program) -> Analysis {
        let produced: HashSet<Reg> = program
            .instructions()
            .iter()
            .filter_map(|i| i.writes())
            .collect();

        let external: HashSet<Reg> = program
            .instructions()
            .iter()
            .flat_map(|i| i.reads())
            .filter(|r| !produced.contains(r))
            .collect();

        debug!(
            instructions = program.len(),
            produced = produced.len(),
            external = external.len(),
            "dependency analysis complete"
        );

        Analysis { produced, external }
    }
}
