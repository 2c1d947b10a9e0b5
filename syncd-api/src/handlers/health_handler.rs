//! # Health (`GET /v1/health`)

use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::context::RequestContext;
use crate::handlers::HandlerResult;
use crate::state::ApiState;
use crate::wire::HealthEnvelope;

pub async fn health(
    State(state): State<ApiState>,
    Extension(ctx): Extension<RequestContext>,
) -> HandlerResult {
    let snapshot = state.health.read().await;

    let status = StatusCode::SERVICE_UNAVAILABLE;
    let body = HealthEnvelope {
        status: "unhealthy".to_string(),
        request_id: ctx.request_id.0,
    };

    if !snapshot.evaluated || snapshot.healthy {
        return Ok((
            StatusCode::OK,
            axum::Json(HealthEnvelope {
                status: "healthy".to_string(),
                request_id: ctx.request_id.0,
            }),
        )
            .into_response());
    }

    Ok((status, axum::Json(body)).into_response())
}
