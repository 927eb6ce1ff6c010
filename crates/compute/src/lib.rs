pub mod analysis;
pub mod catalog;
pub mod engine;
pub mod executor;
pub mod program;
pub mod programs;
pub mod reference;
pub mod scheduler;

pub use analysis::{Analysis, AvailabilityTable, DependencyAnalyzer};
pub use catalog::{DestRole, LatencyModel, OpKind, OperandRoles, SrcRole};
pub use engine::{execute, execute_schedule, execute_with, schedule, schedule_with, Engine};
pub use executor::{ExecutionReport, Executor, RegisterFile};
pub use program::{Inputs, Instruction, InstructionRecord, Program, ProgramBuilder, ProgramFile};
pub use programs::DemoProgram;
pub use scheduler::{
    Bundle, BundleScheduler, Schedule, ScheduleReport, ScheduleStats, ScheduledInstruction,
    SchedulerConfig, Step, Violation,
};
