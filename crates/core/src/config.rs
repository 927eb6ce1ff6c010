use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub machine: MachineConfig,
    pub latency: LatencyConfig,
    pub trace: TraceConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `VLIW_PROFILE`. When set (e.g. `WIDE`), every key
    /// is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("VLIW_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            machine: MachineConfig::from_env_profiled(p),
            latency: LatencyConfig::from_env_profiled(p),
            trace: TraceConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  machine:  bundle_width={}, stall_budget={}",
            self.machine.bundle_width,
            self.machine.stall_budget
        );
        tracing::info!(
            "  latency:  size_quantum={}, default_base={}",
            self.latency.size_quantum,
            self.latency.default_base
        );
        tracing::info!("  trace:    log_filter={}", self.trace.log_filter);
    }
}

// ── Machine ───────────────────────────────────────────────────

pub const DEFAULT_BUNDLE_WIDTH: usize = 2;
pub const DEFAULT_STALL_BUDGET: u32 = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Maximum number of instructions issued per bundle.
    pub bundle_width: usize,
    /// Consecutive empty cycles tolerated before giving up.
    pub stall_budget: u32,
}

impl MachineConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            bundle_width: profiled_env_usize(p, "BUNDLE_WIDTH", DEFAULT_BUNDLE_WIDTH),
            stall_budget: profiled_env_u32(p, "STALL_BUDGET", DEFAULT_STALL_BUDGET),
        }
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            bundle_width: DEFAULT_BUNDLE_WIDTH,
            stall_budget: DEFAULT_STALL_BUDGET,
        }
    }
}

// ── Latency ───────────────────────────────────────────────────

pub const DEFAULT_SIZE_QUANTUM: u32 = 10;
pub const DEFAULT_BASE_LATENCY: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyConfig {
    /// One extra cycle per this many units of size (0 disables the term).
    pub size_quantum: u32,
    /// Base latency for kinds missing from the latency table.
    pub default_base: u32,
}

impl LatencyConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            size_quantum: profiled_env_u32(p, "LATENCY_SIZE_QUANTUM", DEFAULT_SIZE_QUANTUM),
            default_base: profiled_env_u32(p, "LATENCY_DEFAULT_BASE", DEFAULT_BASE_LATENCY),
        }
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            size_quantum: DEFAULT_SIZE_QUANTUM,
            default_base: DEFAULT_BASE_LATENCY,
        }
    }
}

// ── Tracing ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl TraceConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            log_filter: profiled_env_or(p, "LOG_FILTER", "warn"),
        }
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            log_filter: "warn".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = Config::default();
        assert_eq!(config.machine.bundle_width, 2);
        assert_eq!(config.machine.stall_budget, 32);
        assert_eq!(config.latency.size_quantum, 10);
        assert_eq!(config.latency.default_base, 1);
        assert_eq!(config.trace.log_filter, "warn");
        assert!(config.profile.is_empty());
        assert_eq!(config.profile_label(), "default");
    }

    #[test]
    fn profiled_key_wins_over_plain_key() {
        // Keys unique to this test so parallel tests do not interfere.
        env::set_var("VLIWTEST_WIDE_BUNDLE_WIDTH", "8");
        env::set_var("BUNDLE_WIDTH_UNUSED_BY_OTHERS", "3");
        assert_eq!(profiled_env_usize("VLIWTEST_WIDE", "BUNDLE_WIDTH", 2), 8);
        assert_eq!(profiled_env_usize("", "BUNDLE_WIDTH_UNUSED_BY_OTHERS", 2), 3);
        env::remove_var("VLIWTEST_WIDE_BUNDLE_WIDTH");
        env::remove_var("BUNDLE_WIDTH_UNUSED_BY_OTHERS");
    }

    #[test]
    fn unparsable_value_falls_back_to_default() {
        env::set_var("VLIWTEST_BAD_STALL_BUDGET", "lots");
        assert_eq!(profiled_env_u32("VLIWTEST_BAD", "STALL_BUDGET_X", 32), 32);
        assert_eq!(profiled_env_u32("", "VLIWTEST_BAD_STALL_BUDGET", 32), 32);
        env::remove_var("VLIWTEST_BAD_STALL_BUDGET");
    }

    #[test]
    fn profile_label_uppercases() {
        let config = Config::for_profile("wide");
        assert_eq!(config.profile, "WIDE");
        assert_eq!(config.profile_label(), "WIDE");
    }
}
