use super::chunker::chunk_text;
use super::error::NarrationError;
use super::language::{detect_language, LanguageChoice, LanguageCode};
use super::model::{MergedAudio, PipelineOutcome, VoiceSettings};
use super::pipeline::ChunkPipeline;
use async_trait::async_trait;
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::Instrument;
use uuid::Uuid;

/// Everything needed to narrate one text
#[derive(Debug, Clone)]
pub struct NarrationRequest {
    pub text: String,
    pub output: PathBuf,
    pub voice_sample: PathBuf,
    pub language: LanguageChoice,
    pub speed: f32,
    pub max_chars: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NarrationSummary {
    pub run_id: Uuid,
    pub language: LanguageCode,
    pub chunk_count: usize,
    pub total_attempts: u32,
    pub audio: MergedAudio,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NarrationResult {
    /// The text was empty after cleaning; nothing was synthesized
    NothingToSynthesize,
    Completed(NarrationSummary),
}

pub struct NarrationService {
    pipeline: ChunkPipeline,
}

impl NarrationService {
    pub fn new(pipeline: ChunkPipeline) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
pub trait NarrationServiceApi: Send + Sync {
    /// Narrate a text into a single audio file
    ///
    /// This operation:
    /// - Normalizes whitespace and splits the text into chunks
    /// - Picks the language (fixed or detected)
    /// - Synthesizes every chunk in order, with retries
    /// - Merges the chunk audio into `request.output`
    ///
    /// Fails without writing `request.output` if any chunk exhausts its retries
    async fn narrate(&self, request: NarrationRequest) -> Result<NarrationResult, NarrationError>;
}

#[async_trait]
impl NarrationServiceApi for NarrationService {
    async fn narrate(&self, request: NarrationRequest) -> Result<NarrationResult, NarrationError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("narration", run_id = %run_id);

        async move {
            // 1. Clean the text
            let cleaned_text = clean_text(&request.text);

            tracing::info!(
                original_length = request.text.chars().count(),
                cleaned_length = cleaned_text.chars().count(),
                "Text cleaned"
            );

            // 2. Split into chunks; nothing left means nothing to do
            let chunks = chunk_text(&cleaned_text, request.max_chars);
            if chunks.is_empty() {
                tracing::info!("Empty text, nothing to synthesize");
                return Ok(NarrationResult::NothingToSynthesize);
            }

            tracing::info!(
                chunk_count = chunks.len(),
                max_chars = request.max_chars,
                "Text split into chunks"
            );

            // 3. Validate voice parameters before touching the backend
            validate_request(&request).await?;

            // 4. Resolve language
            let language = match request.language {
                LanguageChoice::Fixed(code) => code,
                LanguageChoice::Detect => {
                    let detected = detect_language(&cleaned_text);
                    tracing::info!(language_detected = %detected, "Language detected");
                    detected
                }
            };

            let voice = VoiceSettings {
                voice_sample: request.voice_sample.clone(),
                language,
                speed: request.speed,
            };

            // 5. Synthesize and merge
            let start_time = std::time::Instant::now();
            let outcome = self.pipeline.run(&chunks, &voice, &request.output).await?;
            let total_attempts = outcome.total_attempts();

            match outcome {
                PipelineOutcome::Completed { audio, .. } => {
                    tracing::info!(
                        output = %audio.path.display(),
                        chunk_count = chunks.len(),
                        total_attempts,
                        duration_secs = audio.duration.as_secs_f64(),
                        size_bytes = audio.size_bytes,
                        latency_secs = start_time.elapsed().as_secs_f64(),
                        "Narration completed"
                    );
                    Ok(NarrationResult::Completed(NarrationSummary {
                        run_id,
                        language,
                        chunk_count: chunks.len(),
                        total_attempts,
                        audio,
                    }))
                }
                PipelineOutcome::ChunkFailed {
                    chunk_index,
                    reports,
                } => {
                    let attempts = reports.last().map(|r| r.attempts).unwrap_or(0);
                    Err(NarrationError::ChunkFailed {
                        chunk_index,
                        attempts,
                    })
                }
            }
        }
        .instrument(span)
        .await
    }
}

async fn validate_request(request: &NarrationRequest) -> Result<(), NarrationError> {
    if !request.speed.is_finite() || request.speed <= 0.0 {
        return Err(NarrationError::Invalid(format!(
            "speed must be a positive number, got {}",
            request.speed
        )));
    }

    match tokio::fs::metadata(&request.voice_sample).await {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(NarrationError::Invalid(format!(
            "voice sample not found: {}",
            request.voice_sample.display()
        ))),
    }
}

/// Collapse every whitespace run (newlines included) into a single space
pub fn clean_text(text: &str) -> String {
    static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();
    let whitespace_re = WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").unwrap());
    whitespace_re.replace_all(text, " ").trim().to_string()
}
