use std::collections::HashSet;

use tracing::debug;
use vliw_core::{Reg, Result};

use crate::analysis::{Analysis, AvailabilityTable, DependencyAnalyzer};
use crate::program::Program;
use crate::scheduler::metrics::ScheduleStats;
use crate::scheduler::types::{Bundle, SchedulerConfig};

/// The bundle scheduler. Owns the pending pool, the availability table and
/// the cycle counter of a single scheduling run; independent instances never
/// share state.
pub struct BundleScheduler<'p> {
    pub(super) program: &'p Program,
    pub(super) config: SchedulerConfig,
    pub(super) analysis: Analysis,
    /// Unscheduled program positions, in program order (the tie-break).
    pub(super) pool: Vec<usize>,
    pub(super) availability: AvailabilityTable,
    /// External registers seeded at cycle 0.
    pub(super) seeded: Vec<Reg>,
    /// Current issue cycle C.
    pub(super) cycle: u64,
    /// Consecutive empty cycles since the last issued bundle.
    pub(super) stalls: u32,
    pub(super) bundles: Vec<Bundle>,
    pub(super) stats: ScheduleStats,
}

impl<'p> BundleScheduler<'p> {
    /// Create a scheduler that treats every external register as supplied.
    pub fn new(program: &'p Program, config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        let analysis = DependencyAnalyzer::analyze(program);
        let availability = analysis.initial_availability(program.registers().len(), None);
        let seeded = analysis.external_sorted();
        let stats = ScheduleStats::new(config.bundle_width);

        debug!(
            instructions = program.len(),
            width = config.bundle_width,
            external = seeded.len(),
            "bundle scheduler created"
        );

        Ok(Self {
            program,
            config,
            analysis,
            pool: (0..program.len()).collect(),
            availability,
            seeded,
            cycle: 0,
            stalls: 0,
            bundles: Vec::new(),
            stats,
        })
    }

    /// Restrict the external registers seeded at cycle 0 to those named in
    /// `names`. External registers the caller does not supply never become
    /// available, so instructions reading them end in `Unschedulable`.
    pub fn with_supplied<'n>(mut self, names: impl IntoIterator<Item = &'n str>) -> Self {
        let supplied: HashSet<Reg> = names
            .into_iter()
            .filter_map(|n| self.program.registers().lookup(n))
            .collect();
        self.availability = self
            .analysis
            .initial_availability(self.program.registers().len(), Some(&supplied));
        self.seeded = self
            .analysis
            .external_sorted()
            .into_iter()
            .filter(|r| supplied.contains(r))
            .collect();
        self
    }

    /// Current issue cycle.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Program positions not yet placed in a bundle.
    pub fn pending(&self) -> &[usize] {
        &self.pool
    }

    pub fn is_done(&self) -> bool {
        self.pool.is_empty()
    }

    /// Bundles issued so far.
    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    pub fn availability(&self) -> &AvailabilityTable {
        &self.availability
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }
}
