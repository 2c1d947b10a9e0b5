//! # Create (`POST /v1/tasks`)

use axum::extract::{Extension, RawQuery, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use syncd_shared::{RunOption, SyncError};

use crate::context::RequestContext;
use crate::handlers::{validate_name, HandlerResult};
use crate::query::parse_query;
use crate::schema::{validate, SchemaKind};
use crate::state::ApiState;
use crate::wire::{CreateTaskRequest, RunEnvelope, TaskResponseEnvelope};

pub async fn create_task(
    State(state): State<ApiState>,
    Extension(ctx): Extension<RequestContext>,
    RawQuery(raw_query): RawQuery,
    body: axum::body::Bytes,
) -> HandlerResult {
    let query = parse_query(raw_query.as_deref())?;
    let run = query.run.as_deref().map(RunOption::parse).transpose()?;

    // Step 1: decode and validate against the published schema.
    validate(SchemaKind::CreateTask, &body)?;
    let request: CreateTaskRequest = CreateTaskRequest::try_from(body.as_ref())?;
    validate_name(&request.task.name)?;

    // Lifecycle writer lock for the full duration of the handler: create,
    // dispatch, and any persistence all happen while held.
    let _guard = state.lifecycle.write().await;

    // Step 2: reject if the name is already taken. The in-memory
    // collaborator enforces this itself; this explicit check keeps the
    // exact wire message regardless of collaborator implementation.
    if state.controller.task(&ctx, &request.task.name).await.is_ok() {
        return Err(SyncError::bad_request(format!(
            "task with name {} already exists",
            request.task.name
        )));
    }

    match run {
        None => {
            let task = state
                .controller
                .task_create(&ctx, request.task)
                .await
                .map_err(|e| SyncError::internal(e.message()))?;
            Ok((
                StatusCode::CREATED,
                axum::Json(TaskResponseEnvelope::task(task, ctx.request_id)),
            )
                .into_response())
        }
        Some(RunOption::Now) => {
            let task = state
                .controller
                .task_create_and_run(&ctx, request.task)
                .await
                .map_err(|e| SyncError::internal(e.message()))?;
            Ok((
                StatusCode::CREATED,
                axum::Json(TaskResponseEnvelope::task(task, ctx.request_id)),
            )
                .into_response())
        }
        Some(RunOption::Inspect) => {
            let plan = state
                .controller
                .task_inspect(&ctx, request.task.clone())
                .await
                .map_err(|e| SyncError::internal(e.message()))?;
            let envelope = TaskResponseEnvelope::task(request.task, ctx.request_id)
                .with_run(RunEnvelope::from(plan));
            Ok((StatusCode::OK, axum::Json(envelope)).into_response())
        }
    }
}
