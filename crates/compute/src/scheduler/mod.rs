//! Greedy VLIW bundle scheduler.
//!
//! The [`BundleScheduler`] walks the cycle counter forward and packs up to
//! `bundle_width` ready, hazard-free instructions per cycle, taking them in
//! program order. The resulting [`Schedule`] is self-contained and can be
//! checked with [`Schedule::verify`] or replayed by the executor.

pub mod hazard;
pub mod metrics;
pub mod runner;
pub mod types;
pub mod verify;

pub use hazard::{Footprint, Hazard};
pub use metrics::ScheduleStats;
pub use runner::{BundleScheduler, Step};
pub use types::{
    Bundle, BundleReport, Schedule, ScheduleReport, ScheduledInstruction, SchedulerConfig,
    SlotReport,
};
pub use verify::Violation;
