mod cli;
mod config;
mod report;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vliw_compute::{executor, programs, Engine, ProgramFile};

use crate::cli::{CliArgs, Command, DemoArgs, RunArgs, ScheduleArgs};
use crate::config::CliConfig;
use crate::report::RunDocument;

fn main() -> Result<()> {
    vliw_core::config::load_dotenv();
    let env = vliw_core::Config::from_env();
    let args = CliArgs::parse();

    let config = CliConfig::load(&env, args.config.as_deref())
        .context("failed to load configuration")?;

    let default_filter = args.log.clone().unwrap_or_else(|| config.log_filter.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    env.log_summary();

    match args.command {
        Command::Schedule(cmd) => schedule(&config, cmd),
        Command::Run(cmd) => run(&config, cmd),
        Command::Demo(cmd) => demo(&config, cmd),
    }
}

fn schedule(config: &CliConfig, cmd: ScheduleArgs) -> Result<()> {
    let file = ProgramFile::from_path(&cmd.file)?;
    let program = file.program()?;
    let engine = Engine::new(config.scheduler_with(cmd.width))?;
    let schedule = engine
        .schedule(&program)
        .with_context(|| format!("failed to schedule {}", cmd.file.display()))?;

    if cmd.json {
        report::print_json(&schedule.report())
    } else {
        report::print_schedule(&schedule);
        Ok(())
    }
}

fn run(config: &CliConfig, cmd: RunArgs) -> Result<()> {
    let file = ProgramFile::from_path(&cmd.file)?;
    let program = file.program()?;
    let mut inputs = file.inputs.clone();
    for (key, value) in cmd.inputs {
        inputs.insert(key, value);
    }

    let engine = Engine::new(config.scheduler_with(cmd.width))?;
    let schedule = engine
        .schedule_for(&program, &inputs)
        .with_context(|| format!("failed to schedule {}", cmd.file.display()))?;

    let violations = cmd.verify.then(|| schedule.verify());
    if let Some(found) = violations.as_deref() {
        if !found.is_empty() {
            warn!(count = found.len(), "schedule failed verification");
        }
    }

    let registers = executor::replay(&schedule, &inputs)
        .with_context(|| format!("failed to execute {}", cmd.file.display()))?;
    info!(output = ?registers.output(), cycles = registers.cycles(), "run finished");

    if cmd.json {
        report::print_json(&RunDocument {
            schedule: schedule.report(),
            execution: registers.snapshot(),
            violations: violations
                .as_ref()
                .map(|v| v.iter().map(ToString::to_string).collect()),
            comparisons: None,
        })?;
    } else {
        report::print_schedule(&schedule);
        println!();
        if let Some(found) = violations.as_deref() {
            report::print_violations(found);
        }
        report::print_run(&registers);
    }

    match violations {
        Some(found) if !found.is_empty() => bail!("{} schedule violation(s)", found.len()),
        _ => Ok(()),
    }
}

fn demo(config: &CliConfig, cmd: DemoArgs) -> Result<()> {
    let demo = programs::by_name(cmd.name.as_str())?;
    let engine = Engine::new(config.scheduler_with(cmd.width))?;
    let schedule = engine.schedule_for(&demo.program, &demo.inputs)?;
    let registers = executor::replay(&schedule, &demo.inputs)?;
    let comparisons = demo.check(&registers);

    if cmd.json {
        report::print_json(&RunDocument {
            schedule: schedule.report(),
            execution: registers.snapshot(),
            violations: None,
            comparisons: Some(comparisons.as_slice()),
        })?;
    } else {
        println!("{} -- {}", demo.name, demo.description);
        println!();
        report::print_schedule(&schedule);
        println!();
        report::print_run(&registers);
        println!();
        report::print_comparisons(demo.name, &comparisons);
    }

    if comparisons.iter().all(|c| c.within_tolerance) {
        Ok(())
    } else {
        bail!("demo {} does not match its reference values", demo.name)
    }
}
