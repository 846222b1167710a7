//! Core error types for pushin-core.
//!
//! Invalid state transitions are not errors: the controller reports them as
//! [`crate::access::Transition::Ignored`]. The types here cover the ambient
//! surface around the state machine (configuration, storage, validation).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pushin-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Session store / database errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors raised by unlock-session stores and the key-value database.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the database file
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// A stored record could not be decoded
    #[error("Corrupt record '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// Value does not fit the storage column
    #[error("'{field}' too large to store: {value}")]
    OutOfRange { field: &'static str, value: u64 },

    /// Store refused the operation (used by test doubles and read-only stores)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// A count or duration that must be positive was zero
    #[error("'{field}' must be greater than zero")]
    Zero { field: &'static str },

    /// Unknown enum tag
    #[error("Unknown {kind}: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors reported by a block enforcer. Never fatal to the controller.
#[derive(Error, Debug)]
#[error("Enforcement failed: {0}")]
pub struct EnforcementError(pub String);

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
