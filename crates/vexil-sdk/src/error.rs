//! SDK error types

use thiserror::Error;
use vexil_core::{EvaluationError, RegistryError, ValidationError};
use vexil_repository::RepositoryError;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// No source defines the flag
    #[error("Flag {0} does not exist")]
    FlagNotFound(String),

    /// The flag has no stored boolean condition and creating one was not allowed
    #[error("Flag {0} has no boolean condition to set")]
    NoBooleanCondition(String),

    /// A flag source failed while aggregating
    #[error("Flag source '{source_name}' failed: {error}")]
    SourceFailure {
        source_name: String,
        error: RepositoryError,
    },

    /// A condition value failed its validator
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A condition could not be evaluated
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    /// Condition registration failed
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Condition store error
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_not_found() {
        let error = SdkError::FlagNotFound("MY_FLAG".to_string());
        assert_eq!(error.to_string(), "Flag MY_FLAG does not exist");
    }

    #[test]
    fn test_source_failure_names_source() {
        let error = SdkError::SourceFailure {
            source_name: "database".to_string(),
            error: RepositoryError::Other("no such table".to_string()),
        };
        assert!(error.to_string().contains("'database'"));
        assert!(error.to_string().contains("no such table"));
    }

    #[test]
    fn test_evaluation_error_conversion() {
        let error: SdkError = EvaluationError::missing_request("user").into();
        assert!(error.to_string().contains("request is required"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let sdk_error: SdkError = io_error.into();
        assert!(sdk_error.to_string().contains("I/O error"));
    }
}
