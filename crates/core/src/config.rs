use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Runtime configuration, loaded from a TOML file. Every field has a
/// default so an absent file or an empty table is a valid configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root folder receipt files are stored under.
    pub upload_dir: PathBuf,
    /// Path of the CSV log.
    pub log_file: PathBuf,
    /// Upper bound, in milliseconds, on waiting for the log write lock.
    pub lock_wait_ms: u64,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OcrConfig {
    /// Tesseract language code.
    pub lang: String,
    /// Explicit tessdata directory; `None` uses the engine's default search.
    pub data_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            log_file: PathBuf::from("dataset.csv"),
            lock_wait_ms: 2000,
            ocr: OcrConfig::default(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self { lang: "eng".to_string(), data_path: None }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Load `path` if given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
