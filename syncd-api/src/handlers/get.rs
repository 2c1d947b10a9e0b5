//! # Get / List (`GET /v1/tasks[/{name}]`)

use axum::extract::{Extension, Path, State};
use axum::response::IntoResponse;

use crate::context::RequestContext;
use crate::handlers::{validate_name, HandlerResult};
use crate::state::ApiState;
use crate::wire::{TaskResponseEnvelope, TasksListEnvelope};

pub async fn get_task(
    State(state): State<ApiState>,
    Extension(ctx): Extension<RequestContext>,
    Path(name): Path<String>,
) -> HandlerResult {
    validate_name(&name)?;

    let _guard = state.lifecycle.read().await;
    let task = state.controller.task(&ctx, &name).await?;
    Ok(axum::Json(TaskResponseEnvelope::task(task, ctx.request_id)).into_response())
}

pub async fn list_tasks(
    State(state): State<ApiState>,
    Extension(ctx): Extension<RequestContext>,
) -> HandlerResult {
    let _guard = state.lifecycle.read().await;
    let tasks = state.controller.tasks(&ctx).await?;
    Ok(axum::Json(TasksListEnvelope {
        tasks,
        request_id: ctx.request_id.0,
    })
    .into_response())
}
