use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use comic_core::SmoothingSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILENAME: &str = "cbz2epub.ron";

/// Interval between two progress animation frames.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Converter executable used instead of `ebook-convert`.
    pub converter_program: Option<PathBuf>,
    /// Output folder when none is given on the command line.
    pub default_output_dir: Option<PathBuf>,
    pub log_to_file: bool,
    /// Time a progress bar takes to reach a new checkpoint.
    pub progress_duration_ms: u64,
    /// Interval of the interactive tick.
    pub tick_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            converter_program: None,
            default_output_dir: None,
            log_to_file: true,
            progress_duration_ms: 600,
            tick_interval_ms: 75,
        }
    }
}

impl AppConfig {
    pub fn smoothing(&self) -> SmoothingSettings {
        SmoothingSettings {
            duration: Duration::from_millis(self.progress_duration_ms),
            interval: FRAME_INTERVAL,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Loads the configuration at `path`; a missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
