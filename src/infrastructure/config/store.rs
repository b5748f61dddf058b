//! Small persisted key-value settings file.
//!
//! Paths are stored exactly as the user typed them (`~/xtts` stays
//! `~/xtts`) and expanded on every read, so the file survives a moved home
//! directory.

use crate::error::AppError;
use serde_json::{Map, Value};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE_FILE: &str = "database.json";
pub const XTTS_FOLDER_KEY: &str = "xtts_folder";

const PROMPT_MESSAGE: &str =
    "Please enter the absolute path to your XTTS webui installation folder (e.g., ~/my/xtts/webui):";

#[derive(Debug, thiserror::Error)]
pub enum ConfigStoreError {
    #[error("failed to write settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("input closed before a valid directory was entered")]
    PromptClosed,
}

impl From<ConfigStoreError> for AppError {
    fn from(err: ConfigStoreError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Source of interactive answers
pub trait PathPrompt {
    /// Show `message` and return the next answer, or `None` once input is closed
    fn ask(&mut self, message: &str) -> Option<String>;

    /// Tell the user something without asking
    fn notify(&mut self, message: &str);
}

/// Prompts on stderr and reads answers line by line from stdin
pub struct StdinPrompt;

impl PathPrompt for StdinPrompt {
    fn ask(&mut self, message: &str) -> Option<String> {
        eprintln!("\n{}", message);
        eprint!("> ");
        io::stderr().flush().ok();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Expand a leading `~` to the current user's home directory
pub fn expand_home(raw: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (raw, home) {
        ("~", Some(home)) => home,
        (path, Some(home)) if path.starts_with("~/") => home.join(&path[2..]),
        (path, _) => PathBuf::from(path),
    }
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents; a missing, empty or corrupt file reads as empty
    pub fn load(&self) -> Map<String, Value> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Settings file unreadable, starting empty");
                return Map::new();
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            _ => {
                tracing::warn!(
                    path = %self.path.display(),
                    "Settings file is corrupt or empty, starting with a new configuration"
                );
                Map::new()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.load()
            .get(key)
            .and_then(|value| value.as_str())
            .map(str::to_string)
    }

    /// Store `value` under `key`, keeping every other key
    pub fn set(&self, key: &str, value: &str) -> Result<(), ConfigStoreError> {
        let mut data = self.load();
        data.insert(key.to_string(), Value::String(value.to_string()));

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        serde::Serialize::serialize(&Value::Object(data), &mut serializer)?;

        std::fs::write(&self.path, buf).map_err(|source| ConfigStoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Persist `raw` under `key` if it names an existing directory.
    ///
    /// Returns the expanded directory, or `None` when `raw` is not a directory.
    pub fn establish(&self, key: &str, raw: &str) -> Result<Option<PathBuf>, ConfigStoreError> {
        let raw = raw.trim();
        let expanded = expand_home(raw);
        if raw.is_empty() || !expanded.is_dir() {
            return Ok(None);
        }

        self.set(key, raw)?;
        tracing::info!(key, path = %expanded.display(), "Path saved to settings file");
        Ok(Some(expanded))
    }

    /// Directory stored under `key`, asking until a valid one is given.
    pub fn resolve_path(
        &self,
        key: &str,
        prompt: &mut dyn PathPrompt,
    ) -> Result<PathBuf, ConfigStoreError> {
        match self.get(key) {
            Some(stored) => {
                let expanded = expand_home(&stored);
                if expanded.is_dir() {
                    tracing::info!(key, path = %expanded.display(), "Path loaded from settings file");
                    return Ok(expanded);
                }
                prompt.notify(&format!(
                    "Stored path '{}' is not a valid directory. Please provide the correct path.",
                    stored
                ));
            }
            None => prompt.notify(&format!(
                "The '{}' setting was not found in '{}'.",
                key,
                self.path.display()
            )),
        }

        loop {
            let answer = prompt.ask(PROMPT_MESSAGE).ok_or(ConfigStoreError::PromptClosed)?;

            match self.establish(key, &answer) {
                Ok(Some(path)) => {
                    prompt.notify(&format!("Path saved to {}", self.path.display()));
                    return Ok(path);
                }
                Ok(None) => prompt.notify(
                    "Invalid path. The entered path is not a valid directory. Please try again.",
                ),
                Err(e) => {
                    // The directory is valid; failing to remember it costs a prompt next run
                    tracing::warn!(error = %e, "Could not save settings file");
                    return Ok(expand_home(answer.trim()));
                }
            }
        }
    }
}
