pub mod store;

pub use store::{
    expand_home, ConfigStore, ConfigStoreError, PathPrompt, StdinPrompt, DEFAULT_DATABASE_FILE,
    XTTS_FOLDER_KEY,
};

use crate::domain::tts::pipeline::{
    RetryPolicy, DEFAULT_CHUNK_EXTENSION, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_BACKOFF,
};
use crate::domain::tts::DEFAULT_MAX_CHARS;
use crate::error::AppError;
use crate::infrastructure::audio::{DEFAULT_BITRATE_KBPS, DEFAULT_PAUSE};
use crate::infrastructure::repositories::{BackendCommand, DEFAULT_TIMEOUT};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SCRIPT: &str = "core.py";

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub log_format: LogFormat,
    /// JSON file holding persisted settings such as the backend folder
    pub database_file: PathBuf,
    /// Interpreter to use instead of `<backend>/venv/bin/python3`
    pub python_override: Option<PathBuf>,
    pub script: PathBuf,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub retry_backoff: Duration,
    pub chunk_pause: Duration,
    pub bitrate_kbps: u32,
    pub chunk_extension: String,
    pub max_chars: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid value '{value}' for {key}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl Config {
    /// Read configuration from the process environment (and `.env` if present)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup; unset keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config {
            environment: match lookup("ENVIRONMENT").as_deref() {
                Some("production") => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match lookup("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            database_file: lookup("XTTS_DATABASE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_FILE)),
            python_override: lookup("XTTS_PYTHON")
                .filter(|s| !s.trim().is_empty())
                .map(|s| expand_home(&s)),
            script: lookup("XTTS_SCRIPT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRIPT)),
            timeout: Duration::from_secs(parse_or(
                &lookup,
                "XTTS_TIMEOUT_SECS",
                DEFAULT_TIMEOUT.as_secs(),
            )?),
            max_attempts: parse_or(&lookup, "XTTS_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            retry_backoff: Duration::from_millis(parse_or(
                &lookup,
                "XTTS_RETRY_BACKOFF_MS",
                DEFAULT_RETRY_BACKOFF.as_millis() as u64,
            )?),
            chunk_pause: Duration::from_millis(parse_or(
                &lookup,
                "CHUNK_PAUSE_MS",
                DEFAULT_PAUSE.as_millis() as u64,
            )?),
            bitrate_kbps: parse_or(&lookup, "OUTPUT_BITRATE_KBPS", DEFAULT_BITRATE_KBPS)?,
            chunk_extension: lookup("CHUNK_EXTENSION")
                .map(|s| s.trim_start_matches('.').to_string())
                .unwrap_or_else(|| DEFAULT_CHUNK_EXTENSION.to_string()),
            max_chars: parse_or(&lookup, "MAX_CHARS", DEFAULT_MAX_CHARS)?,
        };

        if config.max_attempts == 0 {
            return Err(ConfigError {
                key: "XTTS_MAX_ATTEMPTS",
                value: "0".to_string(),
            });
        }
        if config.max_chars == 0 {
            return Err(ConfigError {
                key: "MAX_CHARS",
                value: "0".to_string(),
            });
        }

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: self.retry_backoff,
        }
    }

    /// Command line used to launch the backend installed at `backend_root`
    pub fn backend_command(&self, backend_root: &Path) -> BackendCommand {
        let mut command = BackendCommand::for_install(backend_root, self.script.clone());
        if let Some(python) = &self.python_override {
            command.program = python.clone();
        }
        command
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError { key, value: raw }),
    }
}
