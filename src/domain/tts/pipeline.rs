//! Drives ordered chunks through the synthesizer, one at a time.
//!
//! Each chunk runs a small state machine (Pending, Attempting, Succeeded or
//! Exhausted). The first Exhausted chunk aborts the run and nothing is
//! merged. Per-chunk files live in a temporary directory owned by the run
//! and removed when the run returns, whatever the outcome.

use super::error::NarrationError;
use super::model::{
    ChunkJob, ChunkReport, ChunkResult, PipelineOutcome, TextChunk, VoiceSettings,
};
use crate::infrastructure::audio::AudioAssembler;
use crate::infrastructure::repositories::TtsRepository;
use anyhow::anyhow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Extension of the per-chunk files the backend writes
pub const DEFAULT_CHUNK_EXTENSION: &str = "mp3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Pause between attempts, gives the accelerator time to release memory
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

#[derive(Debug)]
enum ChunkState {
    Pending,
    Attempting(u32),
    Succeeded,
    Exhausted,
}

pub struct ChunkPipeline {
    tts_repo: Arc<dyn TtsRepository>,
    assembler: AudioAssembler,
    retry: RetryPolicy,
    chunk_extension: String,
}

impl ChunkPipeline {
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        assembler: AudioAssembler,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            tts_repo,
            assembler,
            retry,
            chunk_extension: DEFAULT_CHUNK_EXTENSION.to_string(),
        }
    }

    pub fn with_chunk_extension(mut self, extension: impl Into<String>) -> Self {
        self.chunk_extension = extension.into();
        self
    }

    /// Zero-padded, 1-based file name so name order equals chunk order.
    /// The padding grows with `total` and is never below three digits.
    pub fn part_path(dir: &Path, index: usize, total: usize, extension: &str) -> PathBuf {
        let width = total.to_string().len().max(3);
        dir.join(format!("part_{:0width$}.{}", index + 1, extension, width = width))
    }

    /// Synthesize every chunk in order, then merge into `output`.
    ///
    /// A chunk that exhausts its attempts yields `PipelineOutcome::ChunkFailed`
    /// and `output` is left untouched.
    pub async fn run(
        &self,
        chunks: &[TextChunk],
        voice: &VoiceSettings,
        output: &Path,
    ) -> Result<PipelineOutcome, NarrationError> {
        let work_dir = tempfile::Builder::new()
            .prefix("xtts-narrator-")
            .tempdir()?;

        tracing::info!(
            dir = %work_dir.path().display(),
            chunk_count = chunks.len(),
            "Temporary directory created"
        );

        let total = chunks.len();
        let mut reports = Vec::with_capacity(total);
        let mut produced = Vec::with_capacity(chunks.len());

        for (position, chunk) in chunks.iter().enumerate() {
            let job = ChunkJob::new(
                chunk.clone(),
                Self::part_path(work_dir.path(), chunk.index, total, &self.chunk_extension),
                voice,
            );

            let report = self.synthesize_with_retry(&job, chunks.len()).await;

            if let ChunkResult::Produced(path) = &report.result {
                produced.push(path.clone());
                reports.push(report);
                continue;
            }

            tracing::error!(
                chunk_index = report.index,
                attempts = report.attempts,
                remaining_chunks = chunks.len() - position - 1,
                "Chunk failed on every attempt, aborting run"
            );
            let chunk_index = report.index;
            reports.push(report);
            return Ok(PipelineOutcome::ChunkFailed {
                chunk_index,
                reports,
            });
        }

        tracing::info!(parts = produced.len(), output = %output.display(), "Merging audio parts");

        let assembler = self.assembler.clone();
        let target = output.to_path_buf();
        let audio = tokio::task::spawn_blocking(move || assembler.merge(&produced, &target))
            .await
            .map_err(|e| anyhow!("audio merge task panicked: {}", e))??;

        if let Err(e) = work_dir.close() {
            tracing::warn!(error = %e, "Failed to remove temporary directory");
        }

        Ok(PipelineOutcome::Completed { audio, reports })
    }

    async fn synthesize_with_retry(&self, job: &ChunkJob, total: usize) -> ChunkReport {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempts = 0;
        let mut backoffs = 0;
        let mut state = ChunkState::Pending;

        loop {
            state = match state {
                ChunkState::Pending => ChunkState::Attempting(1),
                ChunkState::Attempting(attempt) => {
                    attempts = attempt;
                    tracing::info!(
                        chunk = job.chunk.index + 1,
                        total,
                        attempt,
                        max_attempts,
                        characters = job.chunk.char_count(),
                        "Generating chunk"
                    );

                    match self.tts_repo.synthesize(job).await {
                        Ok(()) => ChunkState::Succeeded,
                        Err(failure) => {
                            tracing::warn!(
                                chunk_index = job.chunk.index,
                                attempt,
                                reason = %failure,
                                "Chunk attempt failed"
                            );
                            let _ = tokio::fs::remove_file(&job.output_path).await;

                            if attempt >= max_attempts {
                                ChunkState::Exhausted
                            } else {
                                backoffs += 1;
                                tokio::time::sleep(self.retry.backoff).await;
                                ChunkState::Attempting(attempt + 1)
                            }
                        }
                    }
                }
                ChunkState::Succeeded => {
                    return ChunkReport {
                        index: job.chunk.index,
                        attempts,
                        backoffs,
                        result: ChunkResult::Produced(job.output_path.clone()),
                    };
                }
                ChunkState::Exhausted => {
                    return ChunkReport {
                        index: job.chunk.index,
                        attempts,
                        backoffs,
                        result: ChunkResult::Exhausted,
                    };
                }
            };
        }
    }
}
