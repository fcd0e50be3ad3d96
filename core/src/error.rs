//! Core error types for the shopfix toolkit

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for all operations
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Could not connect to '{host}' with user '{user}'")]
    ConnectionFailed {
        host: String,
        user: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("File '{}' was not found", .0.display())]
    FileNotFound(PathBuf),

    /// Both attempts of an external command exited non-zero.
    /// `command` is the redacted rendering, never the one holding the password.
    #[error("Failed to execute command: '{command}' with output: '{output}'")]
    CommandExecutionFailed { command: String, output: String },

    #[error("Could not execute sql: {sql}")]
    ExecutionFailed {
        sql: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Could not connect to database {database}")]
    DatabaseUnavailable {
        database: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using CoreError
pub type Result<T> = std::result::Result<T, CoreError>;
