pub mod chunker;
pub mod error;
pub mod language;
pub mod model;
pub mod pipeline;
pub mod service;

pub use chunker::{chunk_text, split_text_into_chunks, DEFAULT_MAX_CHARS, MIN_CHUNK_CHARS};
pub use error::NarrationError;
pub use language::{detect_language, LanguageChoice, LanguageCode, UnsupportedLanguage};
pub use model::{
    ChunkJob, ChunkReport, ChunkResult, MergedAudio, PipelineOutcome, TextChunk, VoiceSettings,
};
pub use pipeline::{ChunkPipeline, RetryPolicy};
pub use service::{
    clean_text, NarrationRequest, NarrationResult, NarrationService, NarrationServiceApi,
    NarrationSummary,
};
