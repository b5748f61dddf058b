use std::process::ExitCode;

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    BadInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Synthesis failed at chunk {chunk_index} after {attempts} attempts")]
    ChunkFailed { chunk_index: usize, attempts: u32 },

    #[error("Audio assembly failed: {0}")]
    Assembly(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::BadInput(_) => 2,
            Self::Configuration(_) => 3,
            Self::ChunkFailed { .. } => 4,
            Self::Assembly(_) => 5,
            Self::Internal(_) => 1,
        }
    }

    /// Report the error on stderr and turn it into the process exit code
    pub fn into_exit_code(self) -> ExitCode {
        eprintln!("Error: {}", self);
        ExitCode::from(self.exit_code())
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
