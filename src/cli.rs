use crate::domain::tts::LanguageChoice;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Narrate long texts with a local XTTS installation
#[derive(Parser, Debug, Clone)]
#[command(name = "xtts-narrator")]
#[command(version)]
#[command(group(ArgGroup::new("input").required(true).args(["text", "file"])))]
pub struct Cli {
    /// Text to narrate
    pub text: Option<String>,

    /// Read the text from a file instead
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Output audio file (.mp3 or .wav)
    #[arg(short, long, default_value = "output.mp3")]
    pub output: PathBuf,

    /// Reference voice sample to clone
    #[arg(short, long, value_name = "PATH")]
    pub sample: PathBuf,

    /// Language tag (en, es, fr, ...) or `auto` to detect it
    #[arg(short, long, default_value = "en")]
    pub language: LanguageChoice,

    /// Speech speed multiplier
    #[arg(long, default_value_t = 1.0)]
    pub speed: f32,

    /// Maximum characters per chunk
    #[arg(long)]
    pub max_chars: Option<usize>,

    /// XTTS installation folder; remembered for later runs
    #[arg(long, value_name = "PATH")]
    pub xtts_folder: Option<String>,
}
