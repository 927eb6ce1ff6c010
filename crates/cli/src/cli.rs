use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use vliw_core::Value;

/// Greedy VLIW bundle scheduler and executor.
///
/// Packs straight-line programs into fixed-width instruction bundles and
/// replays them deterministically against an input environment.
#[derive(Parser, Debug)]
#[command(name = "vliw", version, about = "Greedy VLIW bundle scheduler and executor")]
pub struct CliArgs {
    /// Scheduler config file (TOML: bundle_width, stall_budget, [latency])
    #[arg(long, global = true, env = "VLIW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter directive (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the bundle schedule of a program file
    Schedule(ScheduleArgs),
    /// Schedule and execute a program file
    Run(RunArgs),
    /// Run a built-in program and check it against reference numerics
    Demo(DemoArgs),
}

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// Program file (TOML with [[instr]] entries)
    pub file: PathBuf,

    /// Bundle width override
    #[arg(long, short = 'w')]
    pub width: Option<usize>,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Program file (TOML with [[instr]] entries and optional [inputs])
    pub file: PathBuf,

    /// Bundle width override
    #[arg(long, short = 'w')]
    pub width: Option<usize>,

    /// Input value, overriding the file's [inputs] (repeatable)
    #[arg(long = "input", short = 'i', value_name = "KEY=VALUE", value_parser = parse_input)]
    pub inputs: Vec<(String, Value)>,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Check schedule invariants before executing
    #[arg(long)]
    pub verify: bool,
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Which built-in program to run
    #[arg(value_enum)]
    pub name: DemoName,

    /// Bundle width override
    #[arg(long, short = 'w')]
    pub width: Option<usize>,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DemoName {
    SumProduct,
    LatencyChain,
    RmsNewton,
    RmsFast,
}

impl DemoName {
    pub fn as_str(self) -> &'static str {
        match self {
            DemoName::SumProduct => "sum-product",
            DemoName::LatencyChain => "latency-chain",
            DemoName::RmsNewton => "rms-newton",
            DemoName::RmsFast => "rms-fast",
        }
    }
}

/// `key=value` where value is an integer (decimal or `0x` hex) or a float.
pub fn parse_input(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    let raw = raw.trim();

    let value = if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16)
            .map(Value::Int)
            .map_err(|e| format!("bad hex value '{}': {}", raw, e))?
    } else if let Ok(i) = raw.parse::<i64>() {
        Value::Int(i)
    } else {
        raw.parse::<f64>()
            .map(Value::Float)
            .map_err(|_| format!("'{}' is neither an integer nor a float", raw))?
    };
    Ok((key.to_string(), value))
}
