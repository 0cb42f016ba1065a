//! Configuration for the editor

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::buffer::DEFAULT_TAB_STOP;

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Columns between tab stops
    pub tab_stop: usize,
    /// Quit presses needed to discard unsaved changes
    pub quit_times: u32,
    /// Seconds a status message stays on screen
    pub message_timeout_secs: u64,
    /// Where to write the log (defaults to `$TMPDIR/quill.log`)
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tab_stop: DEFAULT_TAB_STOP,
            quit_times: 3,
            message_timeout_secs: 5,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config.validate())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from the default location, falling back to the
    /// defaults. A file that exists but cannot be used is returned alongside
    /// the fallback so the caller can report it once logging is up.
    pub fn load_or_default() -> (Self, Option<ConfigError>) {
        match Self::default_path() {
            Some(path) => Self::load_or_default_from(&path),
            None => (Self::default(), None),
        }
    }

    /// Like [`Config::load_or_default`] for an explicit location. A missing
    /// file is not an error.
    pub fn load_or_default_from(path: &Path) -> (Self, Option<ConfigError>) {
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// `~/.config/quill/config.json`
    pub fn default_path() -> Option<PathBuf> {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config").join("quill").join("config.json"))
    }

    /// Clamp values that would make the editor unusable
    pub fn validate(mut self) -> Self {
        self.tab_stop = self.tab_stop.max(1);
        self.quit_times = self.quit_times.max(1);
        self
    }

    /// How long status messages stay visible
    pub fn message_timeout(&self) -> Duration {
        Duration::from_secs(self.message_timeout_secs)
    }

    /// Resolved log file location
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("quill.log"))
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
