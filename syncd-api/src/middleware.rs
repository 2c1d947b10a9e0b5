//! # Middleware Chain
//!
//! Implements the outermost-first chain: request-id assignment, the scoped
//! logger, CORS, and error-envelope normalization. Schema validation lives
//! in each mutating handler as its first action rather than as a generic
//! body-buffering layer — `axum` handlers already see the raw body before
//! any typed extractor runs, so validating there avoids double-buffering
//! it through a layer.
//!
//! `request_context` (this module) is wired up in `routes.rs` as the
//! *outermost* layer, wrapping CORS, tracing, `CatchPanicLayer`, and
//! `TimeoutLayer`. That placement is what lets `realign_error_envelope`
//! see — and normalize — every error response those inner layers can
//! produce on their own, not just the ones `SyncError`'s `IntoResponse`
//! impl builds.

use axum::body::Body;
use axum::extract::Request;
use axum::http::{HeaderValue, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{info_span, Instrument, Span};
use uuid::Uuid;

use syncd_shared::{RequestId, SyncError};

use crate::context::RequestContext;
use crate::wire::ErrorEnvelope;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Step 1 + 2: assign a request id, derive a child logger bound to it plus
/// the method/URI, and attach both as a `RequestContext` in the request's
/// extensions for handlers to pull out.
pub async fn request_context(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::new();
    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
    );

    request
        .extensions_mut()
        .insert(RequestContext::new(request_id, span.clone()));

    let mut response = next.run(request).instrument(span).await;
    response = realign_error_envelope(response, request_id).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Step 5: error-envelope normalization. Runs on every response this
/// middleware sees on the way out — including ones produced by the layers
/// nested *inside* it (`CatchPanicLayer`, `TimeoutLayer`), since
/// `request_context` is the outermost layer in `routes.rs`.
///
/// The blanket `impl IntoResponse for SyncError` below has no access to the
/// request's actual id (the `?` operator converts straight from
/// `SyncError`, bypassing `RequestContext`), so it stamps a throwaway one;
/// this rewrites any already-canonical JSON error envelope's `request_id`
/// field to the real one. A response that is *not* already a canonical
/// envelope — a plain-text body from some other layer's default responder,
/// or an empty body from a bare status like `TimeoutLayer`'s 408 — is
/// re-encoded into one from scratch, per specification's "re-encodes a
/// plain-text 4xx/5xx body as the canonical JSON error envelope".
async fn realign_error_envelope(response: Response, request_id: RequestId) -> Response {
    if !response.status().is_client_error() && !response.status().is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, 1024 * 1024).await {
        Ok(bytes) => bytes,
        Err(_) => return Response::from_parts(parts, Body::empty()),
    };

    let already_canonical = serde_json::from_slice::<serde_json::Value>(&bytes)
        .ok()
        .filter(|value| value.get("request_id").is_some() && value.get("error").is_some())
        .and_then(|mut value| {
            value["request_id"] = serde_json::Value::String(request_id.to_string());
            serde_json::to_vec(&value).ok()
        });

    let payload = match already_canonical {
        Some(patched) => patched,
        None => {
            let message = String::from_utf8_lossy(&bytes).trim().to_string();
            let message = if message.is_empty() {
                parts
                    .status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                message
            };
            let envelope = ErrorEnvelope::new(&SyncError::internal(message), request_id);
            serde_json::to_vec(&envelope).unwrap_or_default()
        }
    };

    parts.headers.insert(
        axum::http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    Response::from_parts(parts, Body::from(payload))
}

/// Permissive CORS. `OPTIONS` requests are answered directly by
/// `tower_http::cors::CorsLayer` configured in `transport.rs`; this helper
/// exists to centralize the allowed-methods list shared by the CORS layer
/// and the 405 `Allow` header.
pub const ALLOWED_METHODS: &[Method] = &[
    Method::GET,
    Method::PUT,
    Method::PATCH,
    Method::POST,
    Method::DELETE,
];

#[must_use]
pub fn allow_header_value() -> String {
    ALLOWED_METHODS
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every handler returns `Result<_, SyncError>`, and this `IntoResponse`
/// impl is the single place a `SyncError` becomes the canonical JSON
/// envelope — handlers never construct an error body by hand. The
/// catch-all normalization for responses that *don't* go through this
/// impl (a caught panic, a timeout trip) is `realign_error_envelope`,
/// above.
impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        let status = axum::http::StatusCode::from_u16(self.status_code())
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);

        // The request id normally comes from the request context; when a
        // handler fails before that context is available (it never
        // should, since this middleware runs first) fall back to a fresh
        // one rather than omitting the field.
        let envelope = ErrorEnvelope::new(&self, RequestId::new());

        let allow = if let SyncError::MethodNotAllowed { allow, .. } = &self {
            Some(allow.join(", "))
        } else {
            None
        };

        let mut response = (status, axum::Json(envelope)).into_response();
        if let Some(allow) = allow {
            if let Ok(value) = HeaderValue::from_str(&allow) {
                response.headers_mut().insert(axum::http::header::ALLOW, value);
            }
        }
        response
    }
}

/// Helper for handlers that already have the request's `RequestContext`
/// and want the error envelope to carry its id rather than a fallback.
#[must_use]
pub fn error_response(err: &SyncError, ctx: &RequestContext) -> Response {
    let status = axum::http::StatusCode::from_u16(err.status_code())
        .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    let envelope = ErrorEnvelope::new(err, ctx.request_id);
    (status, axum::Json(envelope)).into_response()
}

/// Marker used by tests to assert a span carries the expected request id.
#[must_use]
pub fn current_span_has_request_id(span: &Span, id: Uuid) -> bool {
    format!("{span:?}").contains(&id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn realign_overwrites_mismatched_request_id() {
        let real_id = RequestId::new();
        let stale_envelope = ErrorEnvelope::new(&SyncError::not_found("nope"), RequestId::new());
        let response =
            (axum::http::StatusCode::NOT_FOUND, axum::Json(stale_envelope)).into_response();

        let response = realign_error_envelope(response, real_id).await;
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["request_id"], real_id.0.to_string());
    }

    #[tokio::test]
    async fn realign_leaves_success_responses_untouched() {
        let real_id = RequestId::new();
        let response = (axum::http::StatusCode::OK, axum::Json(serde_json::json!({"ok": true})))
            .into_response();

        let response = realign_error_envelope(response, real_id).await;
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    /// `CatchPanicLayer`'s default responder and `TimeoutLayer`'s bare 408
    /// both emit a plain-text (or empty) body, never the canonical
    /// envelope. This is the case `realign_error_envelope` must re-encode
    /// from scratch rather than merely patch a `request_id` field into.
    #[tokio::test]
    async fn realign_wraps_plain_text_body_into_canonical_envelope() {
        let real_id = RequestId::new();
        let response = (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            "Service error",
        )
            .into_response();

        let response = realign_error_envelope(response, real_id).await;
        assert_eq!(
            response.headers().get(axum::http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["request_id"], real_id.0.to_string());
        assert_eq!(value["error"]["message"], "Service error");
    }

    #[tokio::test]
    async fn realign_wraps_empty_body_using_the_status_reason() {
        let real_id = RequestId::new();
        let response = axum::http::StatusCode::REQUEST_TIMEOUT.into_response();

        let response = realign_error_envelope(response, real_id).await;
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["request_id"], real_id.0.to_string());
        assert_eq!(value["error"]["message"], "Request Timeout");
    }
}
