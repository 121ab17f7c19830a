//! Error types for Vexil Core

use thiserror::Error;

/// Raised while building a [`ConditionRegistry`](crate::ConditionRegistry)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The condition type name is already registered
    #[error("Flag condition \"{0}\" already registered.")]
    DuplicateCondition(String),
}

/// Raised by a condition evaluator
///
/// Evaluators never fail on a malformed stored value; the only failure is a
/// context field the condition needs but the caller did not supply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("{field} is required for condition '{condition}'")]
    MissingRequiredContext { condition: String, field: String },
}

impl EvaluationError {
    /// Shorthand for the common "needs a request" case
    pub fn missing_request(condition: impl Into<String>) -> Self {
        EvaluationError::MissingRequiredContext {
            condition: condition.into(),
            field: "request".to_string(),
        }
    }
}

/// A stored or configured condition value failed its validator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid value for condition '{condition}': {message}")]
    InvalidValue { condition: String, message: String },

    #[error("Unknown condition type: {0}")]
    UnknownCondition(String),
}

impl ValidationError {
    pub fn invalid(condition: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            condition: condition.into(),
            message: message.into(),
        }
    }

    /// The human-readable part of the error, without the condition prefix
    pub fn message(&self) -> String {
        match self {
            ValidationError::InvalidValue { message, .. } => message.clone(),
            ValidationError::UnknownCondition(name) => {
                format!("\"{}\" is not a registered condition", name)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EvaluationError>;
