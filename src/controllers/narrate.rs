use crate::cli::Cli;
use crate::domain::tts::{
    NarrationRequest, NarrationResult, NarrationServiceApi, NarrationSummary,
};
use crate::error::{AppError, AppResult};
use anyhow::Context;
use std::sync::Arc;

/// Command-line entry to the narration use case
pub struct NarrateController {
    narration_service: Arc<dyn NarrationServiceApi>,
    default_max_chars: usize,
}

impl NarrateController {
    pub fn new(narration_service: Arc<dyn NarrationServiceApi>, default_max_chars: usize) -> Self {
        Self {
            narration_service,
            default_max_chars,
        }
    }

    /// Text to narrate, from the positional argument or `--file`
    pub fn read_input(cli: &Cli) -> AppResult<String> {
        match (&cli.text, &cli.file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read text file {}", path.display()))
                .map_err(|e| AppError::BadInput(format!("{:#}", e))),
            (None, None) => Err(AppError::BadInput(
                "either a text or --file is required".to_string(),
            )),
        }
    }

    /// Reject a missing voice sample before anything prompts for the backend folder
    pub fn check_voice_sample(cli: &Cli) -> AppResult<()> {
        if cli.sample.is_file() {
            return Ok(());
        }
        Err(AppError::BadInput(format!(
            "voice sample '{}' does not exist or is not a file",
            cli.sample.display()
        )))
    }

    /// Narrate `text` with the options from `cli` and print the run summary
    pub async fn narrate(&self, cli: &Cli, text: String) -> AppResult<NarrationResult> {
        let max_chars = cli.max_chars.unwrap_or(self.default_max_chars);
        if max_chars == 0 {
            return Err(AppError::BadInput(
                "--max-chars must be greater than zero".to_string(),
            ));
        }

        let request = NarrationRequest {
            text,
            output: cli.output.clone(),
            voice_sample: cli.sample.clone(),
            language: cli.language,
            speed: cli.speed,
            max_chars,
        };

        let result = self.narration_service.narrate(request).await?;

        match &result {
            NarrationResult::NothingToSynthesize => {
                println!("Empty text, nothing to synthesize.");
            }
            NarrationResult::Completed(summary) => {
                println!("{}", render_summary(summary));
            }
        }

        Ok(result)
    }
}

pub fn render_summary(summary: &NarrationSummary) -> String {
    format!(
        "Audio saved to {}\n  chunks:   {}\n  attempts: {}\n  language: {}\n  duration: {:.2} s\n  size:     {} bytes",
        summary.audio.path.display(),
        summary.chunk_count,
        summary.total_attempts,
        summary.language,
        summary.audio.duration.as_secs_f64(),
        summary.audio.size_bytes,
    )
}
