//! # Task Lifecycle Handlers
//!
//! One module per HTTP concern: create, get/list,
//! update, delete, plus the status and health endpoints. Every handler
//! takes the shared `ApiState`, extracts its `RequestContext` from request
//! extensions, and returns `Result<Response, SyncError>` — the error
//! envelope normalization in `middleware.rs` does the rest.

pub mod create;
pub mod delete;
pub mod get;
pub mod health_handler;
pub mod status_handlers;
pub mod update;

use axum::response::Response;

use syncd_shared::SyncError;

pub(crate) fn validate_name(name: &str) -> Result<(), SyncError> {
    syncd_shared::task::validate_task_name(name)
        .map_err(SyncError::bad_request)
}

pub(crate) type HandlerResult = Result<Response, SyncError>;
