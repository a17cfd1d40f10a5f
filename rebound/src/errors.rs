//! Error types for models and for process setup.

use thiserror::Error;

use rebound_repository::SearchError;

/// Errors a model operation can produce.
///
/// Validation is the only class the model raises itself; everything the
/// connection reports passes through untouched as [`ModelError::Connection`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The schema rejected the document. Displays as the messages joined
    /// with newlines.
    #[error("{}", .messages.join("\n"))]
    Validation {
        /// Validation messages in the order the schema reported them.
        messages: Vec<String>,
    },

    /// Error reported by the search connection.
    #[error(transparent)]
    Connection(#[from] SearchError),

    /// The operation could not be scheduled.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl ModelError {
    /// Create a validation error.
    pub fn validation(messages: Vec<String>) -> Self {
        Self::Validation { messages }
    }

    /// Create a runtime error.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Whether the schema rejected the document.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Errors that can occur while loading configuration or wiring dependencies.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An environment value could not be parsed.
    #[error("Invalid value for {key}: {value}")]
    InvalidValue {
        /// Environment variable name.
        key: String,
        /// Offending value.
        value: String,
    },

    /// The search connection could not be created or reached.
    #[error("Connection error: {0}")]
    Connection(#[from] SearchError),

    /// The cluster answered but reported itself unhealthy.
    #[error("OpenSearch cluster is unhealthy")]
    Unhealthy,

    /// A global tracing subscriber could not be installed.
    #[error("Telemetry error: {0}")]
    Telemetry(String),
}

impl ConfigError {
    /// Create an invalid value error.
    pub fn invalid(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }
}
