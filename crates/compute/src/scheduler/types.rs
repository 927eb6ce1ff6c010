use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use vliw_core::config::{Config, DEFAULT_BUNDLE_WIDTH, DEFAULT_STALL_BUDGET};
use vliw_core::{Reg, RegisterTable, Result, VliwError};

use crate::analysis::AvailabilityTable;
use crate::catalog::LatencyModel;
use crate::program::Instruction;

use super::metrics::ScheduleStats;

/// Scheduler configuration, typically parsed from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Maximum instructions per bundle (W).
    #[serde(default = "default_bundle_width")]
    pub bundle_width: usize,
    /// Consecutive stall cycles tolerated before reporting `Unschedulable`.
    #[serde(default = "default_stall_budget")]
    pub stall_budget: u32,
    /// Per-kind latencies and the size term.
    #[serde(default)]
    pub latency: LatencyModel,
}

fn default_bundle_width() -> usize { DEFAULT_BUNDLE_WIDTH }
fn default_stall_budget() -> u32 { DEFAULT_STALL_BUDGET }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            bundle_width: default_bundle_width(),
            stall_budget: default_stall_budget(),
            latency: LatencyModel::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn with_width(bundle_width: usize) -> Self {
        Self {
            bundle_width,
            ..Self::default()
        }
    }

    /// Machine and latency knobs from the environment config.
    pub fn from_env_config(config: &Config) -> Self {
        Self {
            bundle_width: config.machine.bundle_width,
            stall_budget: config.machine.stall_budget,
            latency: LatencyModel::from_config(&config.latency),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| VliwError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bundle_width == 0 {
            return Err(VliwError::InvalidArgument(
                "bundle width must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn latency_of(&self, instr: &Instruction) -> u32 {
        self.latency.latency(instr.kind, instr.size)
    }
}

/// An instruction placed in a bundle, with the position it had in the
/// program and the latency it was scheduled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledInstruction {
    pub position: usize,
    pub instruction: Instruction,
    pub latency: u32,
}

/// Instructions issued together at `start_cycle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub start_cycle: u64,
    pub slots: Vec<ScheduledInstruction>,
}

impl Bundle {
    /// Latency of the slowest member; the issue cycle advances by this much.
    pub fn latency(&self) -> u32 {
        self.slots.iter().map(|s| s.latency).max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots.iter().map(|s| s.position)
    }
}

/// Ordered bundles covering every instruction of a program exactly once.
///
/// Self-contained: carries the register table and the set of registers the
/// caller must supply, so it can be replayed against many input
/// environments without the originating program.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub(crate) bundles: Vec<Bundle>,
    pub(crate) registers: Arc<RegisterTable>,
    pub(crate) external: Vec<Reg>,
    pub(crate) seeded: Vec<Reg>,
    pub(crate) availability: AvailabilityTable,
    pub(crate) program_len: usize,
    pub(crate) width: usize,
    pub(crate) stats: ScheduleStats,
}

impl Schedule {
    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    pub fn registers(&self) -> &Arc<RegisterTable> {
        &self.registers
    }

    /// Bundle width the schedule was built for.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Registers read but never produced by the program, sorted by key.
    pub fn external(&self) -> &[Reg] {
        &self.external
    }

    pub fn is_external(&self, reg: Reg) -> bool {
        self.external.binary_search(&reg).is_ok()
    }

    /// Final availability cycle of a register, by name.
    pub fn availability(&self, name: &str) -> Option<u64> {
        self.registers.lookup(name).and_then(|r| self.availability.get(r))
    }

    pub fn availability_table(&self) -> &AvailabilityTable {
        &self.availability
    }

    pub fn stats(&self) -> &ScheduleStats {
        &self.stats
    }

    /// Program positions in issue order.
    pub fn issue_order(&self) -> Vec<usize> {
        self.bundles.iter().flat_map(|b| b.positions()).collect()
    }

    /// Name-resolved, serializable view.
    pub fn report(&self) -> ScheduleReport {
        ScheduleReport {
            width: self.width,
            stats: self.stats.clone(),
            external: self
                .external
                .iter()
                .map(|r| self.registers.name(*r).to_string())
                .collect(),
            bundles: self
                .bundles
                .iter()
                .map(|b| BundleReport {
                    start_cycle: b.start_cycle,
                    latency: b.latency(),
                    instructions: b
                        .slots
                        .iter()
                        .map(|s| SlotReport {
                            position: s.position,
                            text: s.instruction.render(&self.registers),
                            latency: s.latency,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bundle in &self.bundles {
            writeln!(f, "Cycle {}:", bundle.start_cycle)?;
            for slot in &bundle.slots {
                writeln!(
                    f,
                    "    [{}] {} -> latency {}",
                    slot.position,
                    slot.instruction.render(&self.registers),
                    slot.latency
                )?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleReport {
    pub width: usize,
    pub stats: ScheduleStats,
    pub external: Vec<String>,
    pub bundles: Vec<BundleReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BundleReport {
    pub start_cycle: u64,
    pub latency: u32,
    pub instructions: Vec<SlotReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotReport {
    pub position: usize,
    pub text: String,
    pub latency: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::OpKind;

    #[test]
    fn scheduler_config_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.bundle_width, 2);
        assert_eq!(config.stall_budget, 32);
        assert_eq!(config.latency, LatencyModel::default());
    }

    #[test]
    fn from_toml_fills_missing_fields() {
        let config = SchedulerConfig::from_toml_str("bundle_width = 4").unwrap();
        assert_eq!(config.bundle_width, 4);
        assert_eq!(config.stall_budget, 32);
        assert_eq!(config.latency.base_latency(OpKind::Mul), 2);
    }

    #[test]
    fn from_toml_with_latency_overrides() {
        let text = r#"
            bundle_width = 3
            stall_budget = 8

            [latency]
            size_quantum = 4
            default_base = 5

            [latency.base]
            ADD = 2
            LOAD = 1
        "#;
        let config = SchedulerConfig::from_toml_str(text).unwrap();
        assert_eq!(config.stall_budget, 8);
        assert_eq!(config.latency.latency(OpKind::Add, 8), 4);
        assert_eq!(config.latency.latency(OpKind::Load, 0), 1);
        // Not in the table: default_base.
        assert_eq!(config.latency.latency(OpKind::Mul, 0), 5);
    }

    #[test]
    fn zero_width_is_rejected() {
        assert!(matches!(
            SchedulerConfig::from_toml_str("bundle_width = 0"),
            Err(VliwError::InvalidArgument(_))
        ));
    }

    #[test]
    fn unknown_op_in_latency_table_is_a_config_error() {
        let err = SchedulerConfig::from_toml_str("[latency.base]\nFMA = 4").unwrap_err();
        assert!(matches!(err, VliwError::Config(msg) if msg.contains("FMA")));
    }

    #[test]
    fn from_env_config_copies_knobs() {
        let mut env = Config::default();
        env.machine.bundle_width = 6;
        env.latency.size_quantum = 0;
        let config = SchedulerConfig::from_env_config(&env);
        assert_eq!(config.bundle_width, 6);
        assert_eq!(config.latency.latency(OpKind::Load, 100), 3);
    }

    #[test]
    fn empty_bundle_has_zero_latency() {
        let bundle = Bundle { start_cycle: 0, slots: vec![] };
        assert_eq!(bundle.latency(), 0);
        assert!(bundle.is_empty());
    }
}
