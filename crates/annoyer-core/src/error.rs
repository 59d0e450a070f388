//! Core error types for annoyer-core.
//!
//! Missing or corrupt storage never reaches the caller: it is absorbed by
//! [`Store::load`](crate::storage::Store::load) and replaced with defaults.
//! What does surface are failed reads and writes and rejected setting values.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for annoyer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Writing the storage file failed. The in-memory state still holds the
    /// change; a later `flush()` retries the write.
    #[error("Failed to persist {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The storage file exists but could not be read. It is left untouched.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The storage file is not UTF-8
    #[error("Storage file is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// TOML parse errors
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The storage location could not be determined or created
    #[error("Failed to prepare data directory {path}: {message}")]
    DataDir { path: PathBuf, message: String },

    /// Unknown setting key
    #[error("Unknown setting key: {0}")]
    UnknownKey(String),

    /// Invalid setting value
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    /// Value is not a finite number
    #[error("'{field}' must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    /// Value outside its permitted range
    #[error("'{field}' must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
