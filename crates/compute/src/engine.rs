use std::time::Instant;

use tracing::info;
use vliw_core::{Config, Result};

use crate::executor::{self, RegisterFile};
use crate::program::{Inputs, Program};
use crate::scheduler::{BundleScheduler, Schedule, SchedulerConfig};

/// Schedules and runs programs under one [`SchedulerConfig`].
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: SchedulerConfig,
}

impl Engine {
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Engine configured from the environment.
    pub fn from_env_config(config: &Config) -> Result<Self> {
        Self::new(SchedulerConfig::from_env_config(config))
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Pack `program` assuming every external register will be supplied.
    pub fn schedule(&self, program: &Program) -> Result<Schedule> {
        let start = Instant::now();
        let schedule = BundleScheduler::new(program, self.config.clone())?.run()?;
        info!(
            instructions = program.len(),
            bundles = schedule.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "program scheduled"
        );
        Ok(schedule)
    }

    /// Schedule against the registers `inputs` actually supplies, then replay.
    /// Instructions depending on an unsupplied external never become ready,
    /// so the run fails as `Unschedulable`.
    pub fn execute(&self, program: &Program, inputs: &Inputs) -> Result<RegisterFile> {
        let schedule = self.schedule_for(program, inputs)?;
        executor::replay(&schedule, inputs)
    }

    /// Pack `program` seeding only the external registers `inputs` names.
    pub fn schedule_for(&self, program: &Program, inputs: &Inputs) -> Result<Schedule> {
        BundleScheduler::new(program, self.config.clone())?
            .with_supplied(inputs.keys().map(String::as_str))
            .run()
    }
}

/// Schedule `program` with the default latency model and `bundle_width`.
pub fn schedule(program: &Program, bundle_width: usize) -> Result<Schedule> {
    schedule_with(program, SchedulerConfig::with_width(bundle_width))
}

pub fn schedule_with(program: &Program, config: SchedulerConfig) -> Result<Schedule> {
    Engine::new(config)?.schedule(program)
}

/// Schedule then replay `program` against `inputs`.
pub fn execute(program: &Program, inputs: &Inputs, bundle_width: usize) -> Result<RegisterFile> {
    execute_with(program, inputs, SchedulerConfig::with_width(bundle_width))
}

pub fn execute_with(
    program: &Program,
    inputs: &Inputs,
    config: SchedulerConfig,
) -> Result<RegisterFile> {
    Engine::new(config)?.execute(program, inputs)
}

/// Replay a precomputed schedule, skipping analysis and packing.
pub fn execute_schedule(schedule: &Schedule, inputs: &Inputs) -> Result<RegisterFile> {
    executor::replay(schedule, inputs)
}
