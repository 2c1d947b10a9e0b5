//! # Delete (`DELETE /v1/tasks/{name}`)

use axum::extract::{Extension, Path, State};
use axum::response::IntoResponse;

use crate::context::RequestContext;
use crate::handlers::{validate_name, HandlerResult};
use crate::state::ApiState;
use crate::wire::TaskResponseEnvelope;

pub async fn delete_task(
    State(state): State<ApiState>,
    Extension(ctx): Extension<RequestContext>,
    Path(name): Path<String>,
) -> HandlerResult {
    validate_name(&name)?;

    let _guard = state.lifecycle.write().await;
    state.controller.task_delete(&ctx, &name).await?;

    Ok(axum::Json(TaskResponseEnvelope::minimal(ctx.request_id)).into_response())
}
