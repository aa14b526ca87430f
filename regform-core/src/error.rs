//! src/error.rs
//! ============================================================================
//! # `AppError`: Unified Error Type for the Registration Form
//!
//! Every fallible operation in the crate returns `Result<T, AppError>`.
//! Region lookup failures never surface here: they carry their own
//! `LookupError` taxonomy and end as a region-list state.

use std::{io, path::PathBuf};
use thiserror::Error;


/// Unified error type for registration form operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// TOML config serialization error.
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Config file I/O error with path.
    #[error("Failed to read config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Serialization or deserialization error (JSON fixtures, payloads).
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Avatar file could not be turned into a preview.
    #[error("Avatar read failed for {path:?}: {reason}")]
    AvatarRead { path: PathBuf, reason: String },

    /// A config value or user-supplied value was rejected.
    #[error("Invalid input: {field} - {message}")]
    InvalidInput {
        field: String, // "lookup.base_url", "lookup.api_url"
        message: String,
    },

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl AppError {
    #[must_use]
    /// Attach extra context to an error.
    pub fn with_context<S: Into<String>>(self, ctx: S) -> Self {
        Self::Other(format!("{}: {}", ctx.into(), self))
    }

    /// Create an avatar read error
    pub fn avatar_read<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::AvatarRead {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an input validation error
    pub fn invalid_input<S1: Into<String>, S2: Into<String>>(field: S1, message: S2) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

// Task results carry errors across the channel, so sources that are not
// `Clone` are flattened to their message.
impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            Self::Io(e) => Self::Io(io::Error::new(e.kind(), e.to_string())),
            Self::Config(e) => Self::Other(format!("Config error: {e}")),
            Self::ConfigSerialize(e) => Self::Other(format!("Config serialize error: {e}")),
            Self::ConfigIo { path, source } => Self::ConfigIo {
                path: path.clone(),
                source: io::Error::new(source.kind(), source.to_string()),
            },
            Self::Serde(e) => Self::Other(format!("Serde error: {e}")),
            Self::AvatarRead { path, reason } => Self::AvatarRead {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::InvalidInput { field, message } => Self::InvalidInput {
                field: field.clone(),
                message: message.clone(),
            },
            Self::Other(msg) => Self::Other(msg.clone()),
        }
    }
}

// Allow conversion from `anyhow::Error` as fallback.
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e.to_string())
    }
}
