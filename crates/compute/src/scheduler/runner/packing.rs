use std::sync::Arc;

use tracing::{debug, info, trace, warn};
use vliw_core::{Reg, Result, VliwError};

use crate::scheduler::hazard::Footprint;
use crate::scheduler::types::{Bundle, Schedule, ScheduledInstruction};

use super::BundleScheduler;

/// Outcome of one scheduling step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A bundle was issued at the returned cycle.
    Issued(u64),
    /// Nothing was ready; the cycle advanced by one.
    Stalled,
    /// The pool is empty.
    Done,
}

impl<'p> BundleScheduler<'p> {
    /// Program positions admissible at the current cycle, first-fit in
    /// program order, up to the bundle width.
    fn select(&self) -> Vec<usize> {
        let instructions = self.program.instructions();
        let mut footprint = Footprint::new();
        let mut chosen = Vec::with_capacity(self.config.bundle_width);

        for &position in &self.pool {
            if chosen.len() >= self.config.bundle_width {
                break;
            }
            let instr = &instructions[position];
            if !instr.reads().all(|r| self.availability.is_ready(r, self.cycle)) {
                continue;
            }
            if let Some(hazard) = footprint.conflict(instr) {
                trace!(
                    position,
                    hazard = %hazard.describe(self.program.registers()),
                    "deferred by intra-bundle hazard"
                );
                continue;
            }
            footprint.admit(instr);
            chosen.push(position);
        }

        chosen
    }

    /// Try to issue one bundle at the current cycle.
    ///
    /// An empty selection is a stall: the cycle advances by one. Once more
    /// than `stall_budget` consecutive stalls would be needed, the run fails
    /// with [`VliwError::Unschedulable`].
    pub fn step(&mut self) -> Result<Step> {
        if self.pool.is_empty() {
            return Ok(Step::Done);
        }

        let chosen = self.select();
        if chosen.is_empty() {
            return self.stall();
        }

        let instructions = self.program.instructions();
        let slots: Vec<ScheduledInstruction> = chosen
            .iter()
            .map(|&position| {
                let instruction = instructions[position];
                ScheduledInstruction {
                    position,
                    instruction,
                    latency: self.config.latency_of(&instruction),
                }
            })
            .collect();
        self.pool.retain(|p| !chosen.contains(p));

        let bundle = Bundle { start_cycle: self.cycle, slots };
        for slot in &bundle.slots {
            if let Some(dest) = slot.instruction.writes() {
                self.availability.set(dest, self.cycle + u64::from(slot.latency));
            }
        }

        let issued_at = self.cycle;
        debug!(
            cycle = issued_at,
            size = bundle.len(),
            latency = bundle.latency(),
            positions = ?chosen,
            "bundle issued"
        );

        self.stats.record_bundle(&bundle);
        self.cycle += u64::from(bundle.latency());
        self.stalls = 0;
        self.bundles.push(bundle);
        Ok(Step::Issued(issued_at))
    }

    fn stall(&mut self) -> Result<Step> {
        if self.stalls >= self.config.stall_budget {
            let blocked = self.blocked_registers();
            let names: Vec<&str> = blocked
                .iter()
                .map(|r| self.program.registers().name(*r))
                .collect();
            warn!(
                cycle = self.cycle,
                stalls = self.stalls,
                pending = self.pool.len(),
                blocked = ?names,
                "stall budget exhausted"
            );
            return Err(VliwError::Unschedulable {
                cycle: self.cycle,
                stalls: self.stalls,
                pending: self.pool.clone(),
            });
        }

        trace!(cycle = self.cycle, stalls = self.stalls + 1, "stall cycle");
        self.stalls += 1;
        self.stats.record_stall();
        self.cycle += 1;
        Ok(Step::Stalled)
    }

    /// Source registers of pending instructions that are not yet available.
    pub fn blocked_registers(&self) -> Vec<Reg> {
        let instructions = self.program.instructions();
        let mut blocked: Vec<Reg> = self
            .pool
            .iter()
            .flat_map(|&p| instructions[p].reads())
            .filter(|r| !self.availability.is_ready(*r, self.cycle))
            .collect();
        blocked.sort();
        blocked.dedup();
        blocked
    }

    /// Step until every instruction is placed.
    pub fn run(mut self) -> Result<Schedule> {
        while self.step()? != Step::Done {}

        info!(
            bundles = self.stats.bundles,
            instructions = self.stats.instructions,
            width = self.config.bundle_width,
            makespan = self.stats.makespan,
            stalls = self.stats.stall_cycles,
            "schedule complete"
        );

        Ok(self.finish())
    }

    fn finish(self) -> Schedule {
        Schedule {
            external: self.analysis.external_sorted(),
            registers: Arc::clone(self.program.registers()),
            bundles: self.bundles,
            seeded: self.seeded,
            availability: self.availability,
            program_len: self.program.len(),
            width: self.config.bundle_width,
            stats: self.stats,
        }
    }
}
