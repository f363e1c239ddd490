//! Error types for the JSON service client.
//!
//! # Design
//! The façade is a pass-through: transport, parsing and bridge failures are
//! surfaced as they were produced. The only error this layer originates on
//! its own is `Status`, raised by typed calls when success-only mode is on.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Failures reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The reqwest client failed (connect, DNS, TLS, body read).
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    /// A header name or value could not be placed on the wire.
    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// Any other transport implementation failure.
    #[error("{0}")]
    Other(String),
}

/// Errors returned by `JsonService` calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// Success-only mode is enabled and the server answered with a non-2xx status.
    #[error("response status code does not indicate success: {status} ({reason})")]
    Status { status: u16, reason: String },

    /// A non-empty response body was not valid JSON for the requested shape.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Query data did not serialize to a flat map of fields.
    #[error("invalid query data: {0}")]
    InvalidQuery(String),

    /// The blocking bridge could not build its execution context.
    #[error("failed to start blocking runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl ApiError {
    /// The HTTP status carried by a status-check failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display_includes_code_and_reason() {
        let err = ApiError::Status {
            status: 500,
            reason: "Internal Server Error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "response status code does not indicate success: 500 (Internal Server Error)"
        );
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn transport_error_converts_without_rewrapping_message() {
        let err: ApiError = TransportError::Other("connection refused".to_string()).into();
        assert!(matches!(err, ApiError::Transport(TransportError::Other(_))));
        assert_eq!(err.to_string(), "transport failed: connection refused");
        assert_eq!(err.status(), None);
    }
}
