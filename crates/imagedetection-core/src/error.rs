//! Core error types for imagedetection-core.
//!
//! The scheduling core itself never fails; errors come from the edges:
//! loading configuration, (re)starting the tracking session, and talking to
//! a stopped runtime.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for imagedetection-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tracking session errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Runtime errors
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Config directory could not be resolved or created
    #[error("Config directory unavailable: {0}")]
    DirUnavailable(String),
}

/// Tracking-session errors.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The detection image group is not present in the catalog.
    /// Fatal for experience setup; the owner must stop.
    #[error("Missing expected reference image group '{group}'")]
    MissingReferenceImages { group: String },

    /// The tracking session refused to run the configuration.
    #[error("Tracking session failed to run: {0}")]
    RunFailed(String),
}

/// Errors from the async status service.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The service task has stopped and no longer accepts commands.
    #[error("Status service is closed")]
    Closed,

    /// A background task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for RuntimeError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        RuntimeError::Closed
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
