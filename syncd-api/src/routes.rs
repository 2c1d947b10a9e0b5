//! # Router Assembly
//!
//! Builds the `/v1` route table, wraps it with the CORS, trace, and
//! panic-catching layers and the request-context middleware, and supplies
//! the 404/405 fallbacks.
//!
//! Layer order matters: `request_context` is applied *last*, making it the
//! **outermost** layer. Everything else — CORS, tracing, panic catching,
//! the request timeout — runs *inside* it, so a panic or a timeout trip
//! still passes through `request_context`'s response handling on the way
//! out: the `X-Request-Id` header gets attached and any plain-text error
//! body gets re-encoded into the canonical JSON envelope (`middleware::
//! realign_error_envelope`), exactly like a `SyncError` returned by a
//! handler would.

use std::any::Any;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use syncd_shared::config::ServerConfig;
use syncd_shared::SyncError;

use crate::handlers::{create, delete, get as get_handlers, health_handler, status_handlers, update};
use crate::middleware::{allow_header_value, request_context, ALLOWED_METHODS};
use crate::state::ApiState;

async fn not_found() -> impl IntoResponse {
    SyncError::not_found("no such route").into_response()
}

async fn method_not_allowed_tasks_collection() -> impl IntoResponse {
    SyncError::method_not_allowed(
        "method not allowed",
        vec!["GET".to_string(), "POST".to_string()],
    )
    .into_response()
}

async fn method_not_allowed_tasks_item() -> impl IntoResponse {
    SyncError::method_not_allowed(
        "method not allowed",
        vec!["GET".to_string(), "PATCH".to_string(), "DELETE".to_string()],
    )
    .into_response()
}

async fn method_not_allowed_get_only() -> impl IntoResponse {
    SyncError::method_not_allowed("method not allowed", vec!["GET".to_string()])
        .into_response()
}

/// `CatchPanicLayer`'s responder for a handler panic. Runs *inside*
/// `request_context`, so the envelope it returns here still gets its
/// `request_id` realigned and the `X-Request-Id` header attached on the
/// way out — the panic message itself is logged, never echoed to the
/// caller.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(panic = %details, "handler panicked");
    SyncError::internal("internal server error").into_response()
}

/// Assemble the router using the default request timeout (a 15s read +
/// 15s write budget). Most callers want [`build_with_config`] instead,
/// which derives the timeout from the actual `ServerConfig` in use.
#[must_use]
pub fn build(state: ApiState) -> Router {
    build_with_config(state, &ServerConfig::default())
}

/// Assemble the router with a per-request timeout derived from `cfg`'s
/// read and write timeouts. `tower_http`'s `TimeoutLayer` bounds total
/// request-handling wall time (accept-to-response); it is the closest
/// single-layer analogue `axum` 0.7 offers to a server with independent
/// read/write deadlines, since hyper's `auto::Builder` does not expose
/// separate per-phase timeouts for the service-level API used here. The
/// idle-connection timeout is a keep-alive concern handled by the listener
/// in `transport.rs`, not this per-request layer.
#[must_use]
pub fn build_with_config(state: ApiState, cfg: &ServerConfig) -> Router {
    let request_timeout =
        Duration::from_secs(cfg.read_timeout_secs.saturating_add(cfg.write_timeout_secs));

    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(ALLOWED_METHODS.to_vec())
        .allow_headers(AnyOrigin);

    let v1 = Router::new()
        .route(
            "/tasks",
            get(get_handlers::list_tasks)
                .post(create::create_task)
                .fallback(method_not_allowed_tasks_collection),
        )
        .route(
            "/tasks/:name",
            get(get_handlers::get_task)
                .patch(update::update_task)
                .delete(delete::delete_task)
                .fallback(method_not_allowed_tasks_item),
        )
        .route(
            "/status",
            get(status_handlers::overall_status_handler).fallback(method_not_allowed_get_only),
        )
        .route(
            "/status/tasks",
            get(status_handlers::all_task_status_handler).fallback(method_not_allowed_get_only),
        )
        .route(
            "/status/tasks/:name",
            get(status_handlers::task_status_handler).fallback(method_not_allowed_get_only),
        )
        .route(
            "/health",
            get(health_handler::health).fallback(method_not_allowed_get_only),
        );

    // `request_context` is applied last, so it is the outermost layer: it
    // assigns the request id before CORS/tracing/panic-catching/timeout
    // ever see the request, and its response-side normalization
    // (`middleware::realign_error_envelope`) is the last thing to run on
    // the way out, after those layers have had their chance to short-
    // circuit the response (a caught panic, a timeout trip).
    Router::new()
        .nest("/v1", v1)
        .fallback(not_found)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum::middleware::from_fn(request_context))
        .with_state(state)
}

#[must_use]
pub fn allow_header() -> String {
    allow_header_value()
}
