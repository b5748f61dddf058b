use super::tts_repository::{SynthesisFailure, TtsRepository};
use crate::domain::tts::ChunkJob;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Wall-clock ceiling for one backend call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// How much backend stderr ends up in a failure
const STDERR_EXCERPT_CHARS: usize = 200;

/// How to launch the backend: `<program> [script] <text> <output> -s .. -l .. -speed .. -folder_xtts ..`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCommand {
    pub program: PathBuf,
    pub script: Option<PathBuf>,
    pub backend_root: PathBuf,
}

impl BackendCommand {
    /// The layout of a portable XTTS webui install: its own venv python
    /// running the synthesis script
    pub fn for_install(backend_root: &Path, script: PathBuf) -> Self {
        Self {
            program: backend_root.join("venv").join("bin").join("python3"),
            script: Some(script),
            backend_root: backend_root.to_path_buf(),
        }
    }
}

/// XTTS implementation of TTS repository: one isolated subprocess per chunk
pub struct XttsProcessRepository {
    command: BackendCommand,
    timeout: Duration,
}

impl XttsProcessRepository {
    pub fn new(command: BackendCommand, timeout: Duration) -> Self {
        Self { command, timeout }
    }

    fn build_command(&self, job: &ChunkJob) -> Command {
        let mut cmd = Command::new(&self.command.program);
        if let Some(script) = &self.command.script {
            cmd.arg(script);
        }
        cmd.arg(&job.chunk.text)
            .arg(&job.output_path)
            .arg("-s")
            .arg(&job.voice_sample)
            .arg("-l")
            .arg(job.language.as_str())
            .arg("-speed")
            .arg(job.speed.to_string())
            .arg("-folder_xtts")
            .arg(&self.command.backend_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn check_output_file(path: &Path) -> Result<u64, SynthesisFailure> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.len() > 0 => Ok(meta.len()),
            Ok(_) => Err(SynthesisFailure::EmptyOutput),
            Err(_) => Err(SynthesisFailure::MissingOutput),
        }
    }
}

fn excerpt(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim()
        .chars()
        .take(STDERR_EXCERPT_CHARS)
        .collect()
}

#[async_trait]
impl TtsRepository for XttsProcessRepository {
    async fn synthesize(&self, job: &ChunkJob) -> Result<(), SynthesisFailure> {
        let start_time = std::time::Instant::now();

        tracing::info!(
            chunk_index = job.chunk.index,
            characters = job.chunk.char_count(),
            language = %job.language,
            speed = job.speed,
            output = %job.output_path.display(),
            text_preview = %job.chunk.preview(100),
            "Invoking XTTS backend"
        );

        let child = self.build_command(job).spawn().map_err(|e| {
            tracing::error!(
                error = %e,
                program = %self.command.program.display(),
                "Failed to start XTTS backend"
            );
            SynthesisFailure::Spawn {
                program: self.command.program.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        // Dropping the wait future on timeout drops the child, which kills it
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| SynthesisFailure::Io(e.to_string()))?,
            Err(_) => {
                tracing::warn!(
                    chunk_index = job.chunk.index,
                    timeout_secs = self.timeout.as_secs_f64(),
                    "XTTS backend timed out, process killed"
                );
                return Err(SynthesisFailure::Timeout(self.timeout));
            }
        };

        if !output.status.success() {
            let stderr = excerpt(&output.stderr);
            tracing::warn!(
                chunk_index = job.chunk.index,
                status = ?output.status.code(),
                stderr = %stderr,
                "XTTS backend exited with failure"
            );
            return Err(SynthesisFailure::NonZeroExit {
                status: output.status.code(),
                stderr,
            });
        }

        let size_bytes = Self::check_output_file(&job.output_path)
            .await
            .map_err(|failure| {
                tracing::warn!(
                    chunk_index = job.chunk.index,
                    output = %job.output_path.display(),
                    stdout = %excerpt(&output.stdout),
                    reason = %failure,
                    "XTTS backend reported success without usable audio"
                );
                failure
            })?;

        tracing::info!(
            chunk_index = job.chunk.index,
            size_bytes,
            latency_ms = start_time.elapsed().as_millis() as u64,
            "Chunk audio generated"
        );

        Ok(())
    }
}
