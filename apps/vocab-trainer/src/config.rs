//! Configuration for vocab trainer.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const APP_NAME: &str = "vocab-trainer";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub quiz: QuizConfig,
    #[serde(default)]
    pub spelling: SpellingConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| Self::parse(&s))
            .unwrap_or_default()
    }

    fn parse(content: &str) -> Option<Self> {
        match toml::from_str(content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed config");
                None
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(self)?;
            std::fs::write(path, content)?;
        }
        Ok(())
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("", "", APP_NAME)
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|d| d.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|d| d.data_dir().to_path_buf())
    }

    pub fn db_path() -> Option<PathBuf> {
        Self::data_dir().map(|d| d.join("vocab.db"))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::data_dir().map(|d| d.join("vocab-trainer.log"))
    }

    /// Directory scanned for word lists at startup.
    pub fn import_dir(&self) -> Option<PathBuf> {
        self.import
            .directory
            .clone()
            .or_else(|| Self::data_dir().map(|d| d.join("vocab")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    #[serde(default = "default_word_count")]
    pub word_count: usize,
    #[serde(default = "default_answer_delay")]
    pub answer_delay_ms: u64,
}

fn default_word_count() -> usize { 50 }
fn default_answer_delay() -> u64 { 1500 }

impl QuizConfig {
    pub fn answer_delay(&self) -> Duration {
        Duration::from_millis(self.answer_delay_ms)
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            word_count: 50,
            answer_delay_ms: 1500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellingConfig {
    #[serde(default = "default_word_count")]
    pub word_count: usize,
    #[serde(default = "default_retry_clear_delay")]
    pub retry_clear_delay_ms: u64,
    #[serde(default = "default_feedback_hide_delay")]
    pub feedback_hide_delay_ms: u64,
}

fn default_retry_clear_delay() -> u64 { 800 }
fn default_feedback_hide_delay() -> u64 { 1500 }

impl SpellingConfig {
    pub fn retry_clear_delay(&self) -> Duration {
        Duration::from_millis(self.retry_clear_delay_ms)
    }

    pub fn feedback_hide_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_hide_delay_ms)
    }
}

impl Default for SpellingConfig {
    fn default() -> Self {
        Self {
            word_count: 50,
            retry_clear_delay_ms: 800,
            feedback_hide_delay_ms: 1500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

fn default_true() -> bool { true }
fn default_command() -> String { "espeak".to_string() }
fn default_args() -> Vec<String> { vec!["-s".to_string(), "150".to_string()] }

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: default_command(),
            args: default_args(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub show_phonetic: bool,
    #[serde(default = "default_true")]
    pub show_examples: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_phonetic: true,
            show_examples: true,
        }
    }
}
