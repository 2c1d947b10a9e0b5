//! # Status (`GET /v1/status`, `/v1/status/tasks[/{name}]`)

use axum::extract::{Extension, Path, RawQuery, State};
use axum::response::IntoResponse;

use crate::context::RequestContext;
use crate::handlers::{validate_name, HandlerResult};
use crate::query::parse_query;
use crate::state::ApiState;
use crate::status::{all_task_statuses, overall_status, task_status, DerivedStatus};
use crate::wire::{task_status_map, OverallStatusEnvelope};

pub async fn overall_status_handler(
    State(state): State<ApiState>,
    Extension(ctx): Extension<RequestContext>,
) -> HandlerResult {
    let _guard = state.lifecycle.read().await;
    let summary = overall_status(state.controller.as_ref(), &ctx).await?;
    Ok(axum::Json(OverallStatusEnvelope::from(summary)).into_response())
}

pub async fn all_task_status_handler(
    State(state): State<ApiState>,
    Extension(ctx): Extension<RequestContext>,
    RawQuery(raw_query): RawQuery,
) -> HandlerResult {
    let query = parse_query(raw_query.as_deref())?;
    let filter = query
        .status
        .as_deref()
        .map(DerivedStatus::parse)
        .transpose()?;

    let _guard = state.lifecycle.read().await;
    let views = all_task_statuses(
        state.controller.as_ref(),
        &ctx,
        filter,
        query.include_events(),
    )
    .await?;
    Ok(axum::Json(task_status_map(views)).into_response())
}

pub async fn task_status_handler(
    State(state): State<ApiState>,
    Extension(ctx): Extension<RequestContext>,
    Path(name): Path<String>,
    RawQuery(raw_query): RawQuery,
) -> HandlerResult {
    validate_name(&name)?;
    let query = parse_query(raw_query.as_deref())?;

    let _guard = state.lifecycle.read().await;
    let view = task_status(
        state.controller.as_ref(),
        &ctx,
        &name,
        query.include_events(),
    )
    .await?;
    Ok(axum::Json(task_status_map(vec![view])).into_response())
}
