use serde::Serialize;

use super::types::Bundle;

/// Summary of a produced schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleStats {
    /// Number of bundles issued.
    pub bundles: usize,
    /// Number of instructions placed.
    pub instructions: usize,
    /// Configured bundle width.
    pub width: usize,
    /// Empty cycles taken while waiting on operands.
    pub stall_cycles: u64,
    /// Cycle at which the last bundle completes.
    pub makespan: u64,
    /// Filled slots over offered slots (0.0 - 1.0).
    pub utilization: f64,
}

impl ScheduleStats {
    pub fn new(width: usize) -> Self {
        Self {
            bundles: 0,
            instructions: 0,
            width,
            stall_cycles: 0,
            makespan: 0,
            utilization: 0.0,
        }
    }

    /// Record an issued bundle.
    pub fn record_bundle(&mut self, bundle: &Bundle) {
        self.bundles += 1;
        self.instructions += bundle.len();
        self.makespan = self
            .makespan
            .max(bundle.start_cycle + u64::from(bundle.latency()));

        let offered = (self.bundles * self.width) as f64;
        self.utilization = if offered == 0.0 { 0.0 } else { self.instructions as f64 / offered };
    }

    pub fn record_stall(&mut self) {
        self.stall_cycles += 1;
    }

    /// Mean instructions per bundle.
    pub fn issue_rate(&self) -> f64 {
        if self.bundles == 0 {
            0.0
        } else {
            self.instructions as f64 / self.bundles as f64
        }
    }
}
