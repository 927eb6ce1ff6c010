use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vliw_compute::{LatencyModel, SchedulerConfig};
use vliw_core::Config;

/// Keys a `--config` TOML file may set. Absent keys fall through to the
/// environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub bundle_width: Option<usize>,
    #[serde(default)]
    pub stall_budget: Option<u32>,
    #[serde(default)]
    pub latency: Option<LatencyModel>,
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        debug!(?path, "Loading config");
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }
}

/// Fully resolved CLI settings.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub scheduler: SchedulerConfig,
    pub log_filter: String,
}

impl CliConfig {
    /// Environment first, then the file's keys on top.
    pub fn resolve(env: &Config, file: Option<FileConfig>) -> Self {
        let mut scheduler = SchedulerConfig::from_env_config(env);
        let mut log_filter = env.trace.log_filter.clone();

        if let Some(file) = file {
            if let Some(width) = file.bundle_width {
                scheduler.bundle_width = width;
            }
            if let Some(budget) = file.stall_budget {
                scheduler.stall_budget = budget;
            }
            if let Some(latency) = file.latency {
                scheduler.latency = latency;
            }
            if let Some(filter) = file.log_filter {
                log_filter = filter;
            }
        }

        Self { scheduler, log_filter }
    }

    pub fn load(env: &Config, path: Option<&Path>) -> Result<Self> {
        let file = path.map(FileConfig::load).transpose()?;
        Ok(Self::resolve(env, file))
    }

    /// Scheduler config with a command-line width applied.
    pub fn scheduler_with(&self, width: Option<usize>) -> SchedulerConfig {
        let mut config = self.scheduler.clone();
        if let Some(width) = width {
            config.bundle_width = width;
        }
        config
    }
}
