//! Text and JSON rendering of command results.

use anyhow::Result;
use serde::Serialize;
use vliw_compute::programs::Comparison;
use vliw_compute::{ExecutionReport, RegisterFile, Schedule, ScheduleReport, Violation};

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_schedule(schedule: &Schedule) {
    print!("{}", schedule);
    let stats = schedule.stats();
    println!();
    println!(
        "{} instructions in {} bundles (width {}), makespan {} cycles, utilization {:.0}%",
        stats.instructions,
        stats.bundles,
        stats.width,
        stats.makespan,
        stats.utilization * 100.0
    );
    if !schedule.external().is_empty() {
        let names: Vec<&str> = schedule
            .external()
            .iter()
            .map(|r| schedule.registers().name(*r))
            .collect();
        println!("external: {}", names.join(", "));
    }
}

pub fn print_violations(violations: &[Violation]) {
    if violations.is_empty() {
        println!("schedule verified: no violations");
        return;
    }
    println!("schedule has {} violation(s):", violations.len());
    for v in violations {
        println!("  - {}", v);
    }
}

pub fn print_run(file: &RegisterFile) {
    match file.output() {
        Some(value) => println!("output: {}", value),
        None => println!("output: (no sink executed)"),
    }
    for (label, value) in file.outputs() {
        println!("  {} = {}", label, value);
    }
    println!("simulated cycles: {}", file.cycles());
}

pub fn print_comparisons(name: &str, comparisons: &[Comparison]) {
    println!("{}:", name);
    for c in comparisons {
        let actual = c
            .actual
            .map(|a| a.to_string())
            .unwrap_or_else(|| "missing".to_string());
        let mark = if c.within_tolerance { "ok" } else { "MISMATCH" };
        println!("  {:<8} expected {:<22} got {:<22} {}", c.channel, c.expected, actual, mark);
    }
}

/// Combined JSON document for `run --json` and `demo --json`.
#[derive(Debug, Serialize)]
pub struct RunDocument<'a> {
    pub schedule: ScheduleReport,
    pub execution: ExecutionReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparisons: Option<&'a [Comparison]>,
}
