use crate::domain::tts::ChunkJob;
use async_trait::async_trait;
use std::time::Duration;

/// Why a single synthesis attempt failed. The pipeline only cares that it
/// failed; the cause is for logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisFailure {
    #[error("could not start backend '{program}': {reason}")]
    Spawn { program: String, reason: String },
    #[error("backend exited with status {status:?}: {stderr}")]
    NonZeroExit { status: Option<i32>, stderr: String },
    #[error("backend timed out after {0:?}")]
    Timeout(Duration),
    #[error("backend produced no output file")]
    MissingOutput,
    #[error("backend produced an empty output file")]
    EmptyOutput,
    #[error("io error while waiting for backend: {0}")]
    Io(String),
}

/// Repository for speech synthesis of a single chunk.
/// Abstracts the underlying backend (XTTS subprocess, test doubles, ...)
///
/// Implementations are responsible for:
/// - Writing a non-empty audio file at `job.output_path` on success
/// - Bounding each call in time
/// - Never leaving a backend process running after returning
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize one chunk to `job.output_path`
    ///
    /// # Errors
    /// Returns the failure cause if the attempt did not produce usable audio
    async fn synthesize(&self, job: &ChunkJob) -> Result<(), SynthesisFailure>;
}
