//! # Client Error Types
//!
//! Unified error handling for syncd-client library and CLI operations: a
//! thiserror enum with one variant per failure category, plus category
//! constructors and an `is_recoverable` check.

use thiserror::Error;

/// Client operation result type.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors produced by the typed client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("API error: {status} - {message} (request_id: {request_id})")]
    ApiError {
        status: u16,
        message: String,
        request_id: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timeout waiting for operation: {operation}")]
    Timeout { operation: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ClientError {
    #[must_use]
    pub fn api_error(status: u16, message: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
            request_id: request_id.into(),
        }
    }

    #[must_use]
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Whether the error is worth retrying. Per the client's Non-goal
    /// (no retry/backoff policy beyond `WaitForAPI`), this classification
    /// exists for callers to make their own retry decisions — the client
    /// itself never retries automatically.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::HttpError(e) => e.is_timeout() || e.is_connect(),
            Self::ApiError { status, .. } => *status >= 500,
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}
