//! Error types for the ctos site builder.

use std::path::PathBuf;
use thiserror::Error;

/// Build-related errors. Any of these aborts the whole build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BuildError {
    /// Attach the offending path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Visit counter errors
#[derive(Debug, Error)]
pub enum CounterError {
    #[error("Counter store unavailable: {0}")]
    Unavailable(String),

    #[error("Counter storage error: {0}")]
    Storage(String),
}

impl From<sled::Error> for CounterError {
    fn from(err: sled::Error) -> Self {
        CounterError::Storage(err.to_string())
    }
}

/// Top-level errors surfaced by the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Build failed: {0}")]
    Build(#[from] BuildError),

    #[error("Counter error: {0}")]
    Counter(#[from] CounterError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
