//! Search error types.
//!
//! This module defines the errors a search engine connection can report.
//! The model layer passes them through to callers unchanged.

use thiserror::Error;

/// Errors that can occur while talking to the search engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Failed to reach the search engine or to build the transport.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The engine answered with a non-success status.
    #[error("{operation} failed with status {status}: {body}")]
    RequestError {
        /// Name of the engine operation, e.g. `create` or `put_mapping`.
        operation: String,
        /// HTTP status code returned by the engine.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Failed to parse a response from the search engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The request cannot be sent as assembled (e.g. an empty index name).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl SearchError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a request error from an engine reply.
    pub fn request(operation: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::RequestError {
            operation: operation.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// HTTP status of the engine reply, when the engine answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_display() {
        let err = SearchError::request("put_mapping", 400, "mapper_parsing_exception");
        assert_eq!(
            err.to_string(),
            "put_mapping failed with status 400: mapper_parsing_exception"
        );
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_status_absent_for_transport_errors() {
        assert_eq!(SearchError::connection("refused").status(), None);
    }
}
