use std::path::PathBuf;
use thiserror::Error;

/// Infrastructure failures. Domain absence ("no such movie") is never an error;
/// it is reported as an empty list, `None`, or `ExportOutcome::NotFound`.
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Authentication failed for user '{user}'")]
    Authentication { user: String },

    #[error("Query failed ({code}): {message}")]
    Query { code: String, message: String },

    #[error("Unexpected record shape: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid dataset {path}: {message}")]
    Dataset { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
