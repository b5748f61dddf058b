use crate::error::AppError;
use crate::infrastructure::audio::AssemblyError;

#[derive(Debug, thiserror::Error)]
pub enum NarrationError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("chunk {chunk_index} failed after {attempts} attempts")]
    ChunkFailed { chunk_index: usize, attempts: u32 },
    #[error("audio assembly failed: {0}")]
    Assembly(#[from] AssemblyError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<NarrationError> for AppError {
    fn from(err: NarrationError) -> Self {
        match err {
            NarrationError::Invalid(msg) => AppError::BadInput(msg),
            NarrationError::ChunkFailed {
                chunk_index,
                attempts,
            } => AppError::ChunkFailed {
                chunk_index,
                attempts,
            },
            NarrationError::Assembly(e) => AppError::Assembly(e.to_string()),
            NarrationError::Io(e) => AppError::Internal(e.to_string()),
            NarrationError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
