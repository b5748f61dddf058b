use super::language::LanguageCode;
use std::path::PathBuf;
use std::time::Duration;

/// A bounded slice of the input text, ready to be sent to the backend.
///
/// `index` is 0-based and defines the final assembly order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub index: usize,
    pub text: String,
}

impl TextChunk {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// First `max` characters, for log previews
    pub fn preview(&self, max: usize) -> String {
        self.text.chars().take(max).collect()
    }
}

/// Voice parameters shared by every chunk of one run
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    pub voice_sample: PathBuf,
    pub language: LanguageCode,
    pub speed: f32,
}

/// One unit of work for the synthesizer: a chunk plus where its audio goes
#[derive(Debug, Clone)]
pub struct ChunkJob {
    pub chunk: TextChunk,
    pub output_path: PathBuf,
    pub voice_sample: PathBuf,
    pub language: LanguageCode,
    pub speed: f32,
}

impl ChunkJob {
    pub fn new(chunk: TextChunk, output_path: PathBuf, voice: &VoiceSettings) -> Self {
        Self {
            chunk,
            output_path,
            voice_sample: voice.voice_sample.clone(),
            language: voice.language,
            speed: voice.speed,
        }
    }
}

/// Per-chunk result kept by the pipeline, index-aligned with the chunks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkResult {
    Produced(PathBuf),
    Exhausted,
}

/// Bookkeeping for a single chunk: how many attempts and backoff pauses it took
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkReport {
    pub index: usize,
    pub attempts: u32,
    pub backoffs: u32,
    pub result: ChunkResult,
}

/// The merged output file and what it contains
#[derive(Debug, Clone, PartialEq)]
pub struct MergedAudio {
    pub path: PathBuf,
    pub duration: Duration,
    pub size_bytes: u64,
    pub parts_merged: usize,
    pub parts_skipped: usize,
}

/// Aggregate result of one pipeline run. Fail-fast: a failed run never
/// carries a merged file.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Completed {
        audio: MergedAudio,
        reports: Vec<ChunkReport>,
    },
    ChunkFailed {
        chunk_index: usize,
        reports: Vec<ChunkReport>,
    },
}

impl PipelineOutcome {
    pub fn reports(&self) -> &[ChunkReport] {
        match self {
            PipelineOutcome::Completed { reports, .. } => reports,
            PipelineOutcome::ChunkFailed { reports, .. } => reports,
        }
    }

    pub fn total_attempts(&self) -> u32 {
        self.reports().iter().map(|r| r.attempts).sum()
    }
}
