//! User configuration loaded from `config.toml`.
//!
//! Every field has a default so a missing or partial file is fine. Command-line flags are
//! applied on top of the loaded values by the binary.

use crate::error::{FlowlessError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default number of unread lines the producer may buffer ahead of the view.
pub const DEFAULT_BUFFER_LINES: usize = 10_000;

/// Name of the theme to render with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeName {
    #[default]
    Default,
    Monochrome,
    HighContrast,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backpressure capacity: how far ingestion may run ahead of the top visible line.
    pub buffer_lines: usize,
    /// Key poll timeout while a follow mode is active.
    pub follow_poll_ms: u64,
    /// Key poll timeout otherwise.
    pub idle_poll_ms: u64,
    /// Where `--pipe` creates its named pipe.
    pub pipe_path: Option<PathBuf>,
    pub theme: ThemeName,
    pub line_numbers: bool,
    pub separate_columns: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_lines: DEFAULT_BUFFER_LINES,
            follow_poll_ms: 100,
            idle_poll_ms: 500,
            pipe_path: None,
            theme: ThemeName::Default,
            line_numbers: false,
            separate_columns: false,
        }
    }
}

impl Config {
    /// Load from the user's config directory, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            FlowlessError::file_error(format!("cannot read {}", path.display()), e)
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| FlowlessError::config(e.to_string()))
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("flowless").join("config.toml"))
    }

    /// Named pipe location, defaulting to a dotfile in the home directory.
    pub fn resolved_pipe_path(&self) -> PathBuf {
        self.pipe_path.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(".flowless.pipe")
        })
    }

    pub fn follow_poll(&self) -> Duration {
        Duration::from_millis(self.follow_poll_ms)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }
}
