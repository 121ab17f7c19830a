//! Error types for the repository layer

use std::path::PathBuf;
use thiserror::Error;
use vexil_core::RecordId;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur while reading flag sources or writing condition records
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Settings file not found at the specified path
    #[error("Settings not found: {path}")]
    NotFound { path: String },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Invalid path provided
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    /// A record with the same flag, condition and value already exists
    #[error("Flag {name} already has condition '{condition}' with value '{value}'")]
    DuplicateRecord {
        name: String,
        condition: String,
        value: String,
    },

    /// No record with this id
    #[error("Condition record not found: {id}")]
    RecordNotFound { id: RecordId },

    /// Generic error
    #[error("Repository error: {0}")]
    Other(String),
}
