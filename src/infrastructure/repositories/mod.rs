pub mod tts_repository;
pub mod xtts_process_repository;

pub use tts_repository::{SynthesisFailure, TtsRepository};
pub use xtts_process_repository::{BackendCommand, XttsProcessRepository, DEFAULT_TIMEOUT};
