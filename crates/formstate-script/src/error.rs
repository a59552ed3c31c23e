//! Error types for formstate-script

use thiserror::Error;

/// Form definition loading error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Duplicate field definition: {0}")]
    DuplicateField(String),

    #[error("Invalid initial value for {field}: expected {expected}, got {got}")]
    InvalidValue {
        field: String,
        expected: String,
        got: String,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
