//! Error types for the attribute container.

use thiserror::Error;

/// Attribute container result type alias
pub type Result<T> = std::result::Result<T, AttributesError>;

/// Attribute container error taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributesError {
    /// One or more required keys did not resolve after construction.
    ///
    /// The message carries no line terminator; it is embedded in JSON bodies.
    #[error("\"{}\" cannot be empty.", .missing.join(","))]
    Validation { missing: Vec<String> },

    #[error("json_encode error: {message}")]
    Serialization { message: String },

    #[error("json_decode error: {message}")]
    Deserialization { message: String },

    /// `push` found the largest integer key already at `i64::MAX`.
    #[error("cannot push: the next element index is already occupied")]
    IndexExhausted,
}

impl AttributesError {
    /// Keys reported missing by a validation failure; empty for other errors.
    pub fn missing_keys(&self) -> &[String] {
        match self {
            Self::Validation { missing } => missing,
            Self::Serialization { .. } | Self::Deserialization { .. } | Self::IndexExhausted => {
                &[]
            }
        }
    }
}

impl From<serde_json::Error> for AttributesError {
    fn from(err: serde_json::Error) -> Self {
        AttributesError::Serialization {
            message: err.to_string(),
        }
    }
}
