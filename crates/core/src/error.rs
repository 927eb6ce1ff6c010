use thiserror::Error;

#[derive(Error, Debug)]
pub enum VliwError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Register read before it was written: {0}")]
    UnwrittenRegister(String),

    /// The scheduler ran out of stall cycles without admitting anything.
    /// `pending` holds the program positions that never became ready.
    #[error("Unschedulable: no progress after {stalls} stall cycles at cycle {cycle} ({} instructions pending)", pending.len())]
    Unschedulable {
        cycle: u64,
        stalls: u32,
        pending: Vec<usize>,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid program: {0}")]
    InvalidProgram(String),

    #[error("Type mismatch in {op}: {detail}")]
    TypeMismatch { op: String, detail: String },

    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, VliwError>;

impl VliwError {
    /// True for failures that come from the program's shape rather than
    /// from the values fed to it.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            VliwError::UnknownOperation(_)
                | VliwError::Unschedulable { .. }
                | VliwError::InvalidProgram(_)
        )
    }
}
