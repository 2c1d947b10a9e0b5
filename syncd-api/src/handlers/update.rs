//! # Update (`PATCH /v1/tasks/{name}`)

use axum::extract::{Extension, Path, RawQuery, State};
use axum::response::IntoResponse;

use syncd_shared::RunOption;

use crate::context::RequestContext;
use crate::handlers::{validate_name, HandlerResult};
use crate::query::parse_query;
use crate::schema::{validate, SchemaKind};
use crate::state::ApiState;
use crate::wire::{RunEnvelope, TaskResponseEnvelope, UpdateTaskRequest};

pub async fn update_task(
    State(state): State<ApiState>,
    Extension(ctx): Extension<RequestContext>,
    Path(name): Path<String>,
    RawQuery(raw_query): RawQuery,
    body: axum::body::Bytes,
) -> HandlerResult {
    validate_name(&name)?;
    let query = parse_query(raw_query.as_deref())?;
    let run = query.run.as_deref().map(RunOption::parse).transpose()?;

    // Only `enabled` is mutable; the schema and the decoder's
    // `deny_unknown_fields` both reject any other field, and the decoder
    // rejects a missing `enabled`.
    validate(SchemaKind::UpdateTask, &body)?;
    let request = UpdateTaskRequest::try_from(body.as_ref())?;

    let _guard = state.lifecycle.write().await;

    let plan = state
        .controller
        .task_update(&ctx, &name, request.enabled, run)
        .await?;

    let task = state.controller.task(&ctx, &name).await?;
    let mut envelope = TaskResponseEnvelope::task(task, ctx.request_id);
    if matches!(run, Some(RunOption::Inspect)) {
        envelope = envelope.with_run(RunEnvelope::from(plan));
    }
    Ok(axum::Json(envelope).into_response())
}
