//! src/logging.rs
//! ============================================================================
//! # Logging: JSON-lines tracing to a rolling file
//!
//! The terminal host owns stdout, so every event goes through a
//! non-blocking rolling file appender as one JSON object per line. Span and
//! event fields follow the `marker` / `operation_type` convention used
//! throughout the crate.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
    sync::atomic::{AtomicBool, Ordering},
};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter, Layer, filter::Directive, fmt::time::ChronoUtc, layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub log_dir: PathBuf,
    pub log_file_prefix: CompactString,
    pub log_level: CompactString,
    pub max_log_files: usize,
    pub rotation: LogRotation,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum LogRotation {
    Never,
    Daily,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("./logs"),
            log_file_prefix: CompactString::const_new("regform"),
            log_level: CompactString::const_new("info"),
            max_log_files: 10,
            rotation: LogRotation::Daily,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Logger already initialized")]
    AlreadyInitialized,

    #[error("Invalid log directory: {0}")]
    InvalidLogDirectory(String),

    #[error("Failed to create log directory: {0}")]
    DirectoryCreationFailed(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

static INITIALIZED: AtomicBool = AtomicBool::new(false);

fn validate_config(config: &LoggerConfig) -> Result<(), LoggingError> {
    if config.log_file_prefix.is_empty() {
        return Err(LoggingError::ConfigError("log_file_prefix is empty".into()));
    }
    if config.max_log_files == 0 {
        return Err(LoggingError::ConfigError("max_log_files must be > 0".into()));
    }
    make_directive(&config.log_level)?;
    Ok(())
}

fn make_directive(level: &str) -> Result<Directive, LoggingError> {
    Directive::from_str(level)
        .map_err(|e| LoggingError::ConfigError(format!("invalid log level {level:?}: {e}")))
}

fn setup_log_directory(dir: &Path) -> Result<(), LoggingError> {
    if dir.as_os_str().is_empty() {
        return Err(LoggingError::InvalidLogDirectory("empty path".into()));
    }
    if dir.exists() && !dir.is_dir() {
        return Err(LoggingError::InvalidLogDirectory(dir.display().to_string()));
    }
    std::fs::create_dir_all(dir)?;
    Ok(())
}

// Logger builder
pub struct LoggerBuilder {
    config: LoggerConfig,
}

impl LoggerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    /// Installs the global subscriber. Keep the guard alive for the whole
    /// program; dropping it flushes and stops the writer thread.
    pub fn build(self) -> Result<WorkerGuard, LoggingError> {
        validate_config(&self.config)?;

        if INITIALIZED.swap(true, Ordering::AcqRel) {
            return Err(LoggingError::AlreadyInitialized);
        }

        let result = self.install();
        if result.is_err() {
            INITIALIZED.store(false, Ordering::Release);
        }
        result
    }

    fn install(&self) -> Result<WorkerGuard, LoggingError> {
        setup_log_directory(&self.config.log_dir)?;

        let rotation = match self.config.rotation {
            LogRotation::Never => Rotation::NEVER,
            LogRotation::Daily => Rotation::DAILY,
        };

        let file_appender = RollingFileAppender::builder()
            .rotation(rotation)
            .filename_prefix(self.config.log_file_prefix.as_str())
            .filename_suffix("jsonl")
            .max_log_files(self.config.max_log_files)
            .build(&self.config.log_dir)
            .map_err(|e| LoggingError::ConfigError(format!("file appender: {e}")))?;

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let filter = EnvFilter::from_default_env().add_directive(make_directive(&self.config.log_level)?);

        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(false)
            .with_file(true)
            .with_line_number(true)
            .with_writer(non_blocking)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(json_layer)
            .try_init()
            .map_err(|e| LoggingError::ConfigError(format!("global subscriber: {e}")))?;

        Ok(guard)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience entry points.
pub struct Logger;

impl Logger {
    /// Installs logging from a config section.
    pub fn init(config: &LoggerConfig) -> Result<WorkerGuard, LoggingError> {
        LoggerBuilder::new().with_config(config.clone()).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_level() {
        let config = LoggerConfig {
            log_level: CompactString::const_new("regform=loud"),
            ..LoggerConfig::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(LoggingError::ConfigError(_))
        ));
    }

    #[test]
    fn test_rejects_file_as_log_dir() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            setup_log_directory(file.path()),
            Err(LoggingError::InvalidLogDirectory(_))
        ));
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&LoggerConfig::default()).is_ok());
    }
}
