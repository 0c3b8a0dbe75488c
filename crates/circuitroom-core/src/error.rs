//! Core error types for circuitroom-core.
//!
//! The workout engine itself never fails: bad input is clamped and missing
//! audio is ignored. Errors only surface at the edges (editing a locked
//! configuration source, loading or saving preferences, driving the runtime).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for circuitroom-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Preferences could not be rendered as TOML
    #[error("TOML render error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// The runtime actor is gone or refused a command
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The source is locked while a workout is running
    #[error("Configuration is locked while the workout is running")]
    Locked,

    /// Unknown workout field name
    #[error("Unknown workout field '{0}' (expected stations, rounds, train, swap or rest)")]
    UnknownField(String),

    /// Unknown preferences key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for CoreError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        CoreError::Runtime("workout runtime has shut down".into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
