//! Error types for the web helpers.

use std::path::PathBuf;

use ledc_attributes::AttributesError;
use thiserror::Error;

use crate::exception::{ErrorKind, HandledError};

/// Webman result type alias
pub type Result<T> = std::result::Result<T, WebmanError>;

/// Webman error taxonomy
#[derive(Debug, Error)]
pub enum WebmanError {
    /// A user-facing business rule failure. The message is shown to clients.
    #[error("{message}")]
    Business { message: String, code: i64 },

    /// A value could not be coerced to the requested type.
    #[error("variable type error：{type_name}")]
    Type { type_name: String },

    #[error("config error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Attributes(#[from] AttributesError),

    #[error("id generator error: {0}")]
    IdGenerator(String),
}

impl WebmanError {
    /// Create a business error with an explicit response code
    pub fn business(message: impl Into<String>, code: i64) -> Self {
        Self::Business {
            message: message.into(),
            code,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a config error with source
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

impl HandledError for WebmanError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Business { .. } => ErrorKind::Business,
            Self::Type { .. } | Self::Attributes(_) => ErrorKind::InvalidArgument,
            Self::Io { .. } => ErrorKind::File,
            Self::IdGenerator(_) => ErrorKind::Runtime,
            Self::Config { .. } => ErrorKind::Internal,
        }
    }

    fn code(&self) -> i64 {
        match self {
            Self::Business { code, .. } => *code,
            _ => 0,
        }
    }
}
