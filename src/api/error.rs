//! Error taxonomy for backend calls.
//!
//! Provides structured error classification and the user-facing message
//! shown by front ends in alerts.

use thiserror::Error;

use crate::schema::ValidationError;

/// Errors that can occur while talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was aborted because it exceeded its timeout.
    #[error("Connection timed out (Timeout) after {duration_ms}ms. Check the server.")]
    Timeout { duration_ms: u64 },

    /// Non-2xx response, or a body that is not JSON.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Transport failure (DNS, refused connection, reset), passed through unchanged.
    #[error(transparent)]
    Network(#[from] reqwest::Error),

    /// The response decoded as JSON but does not match the expected schema.
    #[error("Invalid response payload: {0}")]
    Validation(#[from] ValidationError),

    /// The response is valid JSON but could not be mapped onto the requested type.
    #[error("Failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request could not be built from the given body and options.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Get error type string for logs and machine consumers.
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Timeout { .. } => "timeout",
            ApiError::Server { .. } => "server_error",
            ApiError::Network(_) => "network_error",
            ApiError::Validation(_) => "validation_error",
            ApiError::Decode(_) => "decode_error",
            ApiError::InvalidRequest(_) => "invalid_request",
        }
    }

    /// Message suitable for showing to the user as-is.
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout { .. })
    }
}
