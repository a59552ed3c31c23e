//! Error types for formstate-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid handler type: {0}")]
    InvalidHandlerType(String),

    #[error("Type mismatch on field {field}: expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: String,
        got: String,
    },

    #[error("Validator failed on field {field}: {reason}")]
    Validator { field: String, reason: String },

    #[error("Unknown view mode: {0}")]
    UnknownViewMode(String),
}

impl Error {
    /// Shorthand for a validator failure on `field`
    pub fn validator(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Validator {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
