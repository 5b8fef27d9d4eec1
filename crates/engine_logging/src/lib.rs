#![deny(missing_docs)]
//! Shared logging utilities for the converter workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! the application logger setup (terminal plus optional log file) and a minimal
//! test initializer for the global logger.

use std::fs::File;
use std::path::PathBuf;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Environment variable that switches the application logger to debug level.
pub const DEBUG_ENV_VAR: &str = "DEBUG_UI";

/// Default log file, relative to the current working directory.
pub const DEFAULT_LOG_FILE: &str = "cbz2epub.log";

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Where and how verbosely the application logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Emit debug-level records instead of info-level ones.
    pub verbose: bool,
    /// Optional log file; `None` logs to the terminal only.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            verbose: debug_requested_by_env(),
            file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }
}

/// Returns true when `DEBUG_UI=1` is set in the environment.
pub fn debug_requested_by_env() -> bool {
    std::env::var(DEBUG_ENV_VAR).is_ok_and(|value| value.trim() == "1")
}

/// Initialize the global logger for the application.
///
/// Always logs to the terminal; additionally writes to `settings.file` when
/// the file can be created. Returns the log file actually in use. A logger
/// that was already installed is left untouched.
pub fn initialize(settings: &LogSettings) -> Option<PathBuf> {
    let level = if settings.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    let mut file_in_use = None;
    if let Some(path) = &settings.file {
        match File::create(path) {
            Ok(file) => {
                loggers.push(WriteLogger::new(level, config, file));
                file_in_use = Some(path.clone());
            }
            Err(err) => {
                eprintln!("Warning: Could not create log file at {:?}: {}", path, err);
            }
        }
    }

    let _ = CombinedLogger::init(loggers);
    file_in_use
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
