//! Structural checks over a finished schedule: width, intra-bundle hazards,
//! operand readiness, cycle monotonicity and coverage.

use thiserror::Error;

use crate::analysis::AvailabilityTable;

use super::hazard::Footprint;
use super::types::Schedule;

/// A broken schedule invariant found by [`Schedule::verify`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("bundle {bundle} holds {size} instructions (width {width})")]
    Overfull { bundle: usize, size: usize, width: usize },

    #[error("bundle {bundle}: instruction {position} has {hazard}")]
    Hazard { bundle: usize, position: usize, hazard: String },

    #[error("bundle {bundle}: instruction {position} reads {register} before it is available")]
    NotReady { bundle: usize, position: usize, register: String },

    #[error("bundle {bundle} starts at cycle {start} after a bundle at cycle {previous}")]
    CycleRegression { bundle: usize, start: u64, previous: u64 },

    #[error("instruction {position} never issued")]
    Missing { position: usize },

    #[error("instruction {position} issued more than once")]
    Duplicate { position: usize },

    #[error("instruction {position} is not part of the program")]
    OutOfRange { position: usize },
}

impl Schedule {
    /// Re-derive every invariant from the bundles alone. Empty means valid.
    pub fn verify(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut seen = vec![0usize; self.program_len];
        let mut availability = AvailabilityTable::new(self.registers.len());
        for reg in &self.seeded {
            availability.set(*reg, 0);
        }
        let mut previous: Option<u64> = None;

        for (b, bundle) in self.bundles.iter().enumerate() {
            if bundle.len() > self.width {
                violations.push(Violation::Overfull {
                    bundle: b,
                    size: bundle.len(),
                    width: self.width,
                });
            }
            if let Some(prev) = previous {
                if bundle.start_cycle < prev {
                    violations.push(Violation::CycleRegression {
                        bundle: b,
                        start: bundle.start_cycle,
                        previous: prev,
                    });
                }
            }
            previous = Some(bundle.start_cycle);

            let mut footprint = Footprint::new();
            for slot in &bundle.slots {
                match seen.get_mut(slot.position) {
                    Some(count) => *count += 1,
                    None => violations.push(Violation::OutOfRange { position: slot.position }),
                }
                for reg in slot.instruction.reads() {
                    if !availability.is_ready(reg, bundle.start_cycle) {
                        violations.push(Violation::NotReady {
                            bundle: b,
                            position: slot.position,
                            register: self.registers.name(reg).to_string(),
                        });
                    }
                }
                if let Some(hazard) = footprint.conflict(&slot.instruction) {
                    violations.push(Violation::Hazard {
                        bundle: b,
                        position: slot.position,
                        hazard: hazard.describe(&self.registers),
                    });
                }
                footprint.admit(&slot.instruction);
            }

            for slot in &bundle.slots {
                if let Some(dest) = slot.instruction.writes() {
                    availability.set(dest, bundle.start_cycle + u64::from(slot.latency));
                }
            }
        }

        for (position, count) in seen.iter().enumerate() {
            match count {
                0 => violations.push(Violation::Missing { position }),
                1 => {}
                _ => violations.push(Violation::Duplicate { position }),
            }
        }

        violations
    }

    pub fn is_valid(&self) -> bool {
        self.verify().is_empty()
    }
}
