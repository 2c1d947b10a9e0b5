//! # Sync Daemon Error Taxonomy
//!
//! Unified error type for the control-plane API and its client. Every
//! variant maps to exactly one of the error categories the transport layer
//! is required to surface: `bad-request`, `not-found`, `method-not-allowed`,
//! `conflict`, `internal-server-error`, `service-unavailable`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used throughout the core.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors produced by the task-lifecycle core and its collaborators.
///
/// Each variant carries the category's canonical HTTP status and response
/// message. Collaborator failures (driver/event-store errors) are always
/// folded into `Internal` at the handler boundary; the category itself is
/// never inferred from string matching.
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
pub enum SyncError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    MethodNotAllowed { message: String, allow: Vec<String> },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    ServiceUnavailable(String),
}

impl SyncError {
    /// HTTP status code for this category.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::MethodNotAllowed { .. } => 405,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
            Self::ServiceUnavailable(_) => 503,
        }
    }

    /// Short machine-readable category label, used only in logs.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad-request",
            Self::NotFound(_) => "not-found",
            Self::MethodNotAllowed { .. } => "method-not-allowed",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal-server-error",
            Self::ServiceUnavailable(_) => "service-unavailable",
        }
    }

    /// The message surfaced in the response envelope's `error.message` field.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::MethodNotAllowed { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn method_not_allowed(message: impl Into<String>, allow: Vec<String>) -> Self {
        Self::MethodNotAllowed {
            message: message.into(),
            allow,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Whether a client encountering this error is worth retrying the call
    /// (used by the client library, not the server).
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_) | Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_is_400() {
        let err = SyncError::bad_request("malformed body");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.category(), "bad-request");
        assert_eq!(err.message(), "malformed body");
    }

    #[test]
    fn not_found_is_404() {
        let err = SyncError::not_found("task 'x' not found");
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.category(), "not-found");
    }

    #[test]
    fn method_not_allowed_carries_allow_list() {
        let err = SyncError::method_not_allowed(
            "method not allowed",
            vec!["GET".to_string(), "PATCH".to_string()],
        );
        assert_eq!(err.status_code(), 405);
        match &err {
            SyncError::MethodNotAllowed { allow, .. } => {
                assert_eq!(allow, &["GET".to_string(), "PATCH".to_string()]);
            }
            _ => panic!("expected MethodNotAllowed"),
        }
    }

    #[test]
    fn conflict_is_409() {
        assert_eq!(SyncError::conflict("busy").status_code(), 409);
    }

    #[test]
    fn internal_is_500_and_recoverable() {
        let err = SyncError::internal("driver exploded");
        assert_eq!(err.status_code(), 500);
        assert!(err.is_recoverable());
    }

    #[test]
    fn service_unavailable_is_503_and_recoverable() {
        let err = SyncError::service_unavailable("not ready");
        assert_eq!(err.status_code(), 503);
        assert!(err.is_recoverable());
    }

    #[test]
    fn bad_request_not_recoverable() {
        assert!(!SyncError::bad_request("nope").is_recoverable());
    }
}
