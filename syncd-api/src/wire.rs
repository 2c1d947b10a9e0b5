//! # Request / Response Mapping
//!
//! Bidirectional translation between the wire schema and the internal
//! task-config model.
//!
//! `TaskConfig` already carries `#[serde(try_from = "String", into =
//! "String")]` on its duration fields (via `WireDuration`) and an
//! externally-tagged `Condition`/`ModuleInput` enum, so it round-trips to
//! and from the wire JSON shape directly — a separate `TaskWire` struct
//! would duplicate every field with no behavioral difference. The mapping
//! layer below covers the parts that genuinely differ between request,
//! response, and internal shapes: the `{"task": ...}` request envelope,
//! the update request's closed field set, and the response envelopes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use syncd_shared::{RequestId, SyncError, TaskConfig};

use crate::controller::InspectPlan;
use crate::status::{OverallStatus, TaskStatusView};

/// `POST /v1/tasks` and dry-run request body: `{"task": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    pub task: TaskConfig,
}

/// `PATCH /v1/tasks/{name}` request body. Only `enabled` is mutable;
/// `deny_unknown_fields` enforces the "any other field rejects" rule at
/// decode time rather than via a manual field scan.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    pub enabled: bool,
}

impl TryFrom<&[u8]> for CreateTaskRequest {
    type Error = SyncError;

    fn try_from(body: &[u8]) -> Result<Self, Self::Error> {
        serde_json::from_slice(body)
            .map_err(|e| SyncError::bad_request(format!("malformed task request body: {e}")))
    }
}

impl TryFrom<&[u8]> for UpdateTaskRequest {
    type Error = SyncError;

    fn try_from(body: &[u8]) -> Result<Self, Self::Error> {
        serde_json::from_slice(body).map_err(|e| {
            SyncError::bad_request(format!(
                "malformed update request body (only 'enabled' is accepted): {e}"
            ))
        })
    }
}

/// `{"error": {"message": ...}, "request_id": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
    pub request_id: Uuid,
}

impl ErrorEnvelope {
    #[must_use]
    pub fn new(err: &SyncError, request_id: RequestId) -> Self {
        Self {
            error: ErrorBody {
                message: err.message(),
            },
            request_id: request_id.0,
        }
    }
}

/// The `run` field of a task response envelope, present only for
/// create/update calls made with `run=inspect` or `run=now`'s plan echo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEnvelope {
    pub plan: String,
    pub changes_present: bool,
}

impl From<InspectPlan> for RunEnvelope {
    fn from(plan: InspectPlan) -> Self {
        Self {
            plan: plan.plan,
            changes_present: plan.changes_present,
        }
    }
}

/// `{"task": ..., "request_id": ..., "run"?: ..., "error"?: ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResponseEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskConfig>,
    pub request_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<RunEnvelope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl TaskResponseEnvelope {
    #[must_use]
    pub fn task(task: TaskConfig, request_id: RequestId) -> Self {
        Self {
            task: Some(task),
            request_id: request_id.0,
            run: None,
            error: None,
        }
    }

    #[must_use]
    pub fn with_run(mut self, run: RunEnvelope) -> Self {
        self.run = Some(run);
        self
    }

    /// Minimal envelope for delete's success response — no task body.
    #[must_use]
    pub fn minimal(request_id: RequestId) -> Self {
        Self {
            task: None,
            request_id: request_id.0,
            run: None,
            error: None,
        }
    }
}

/// `{"tasks": [...], "request_id": ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct TasksListEnvelope {
    pub tasks: Vec<TaskConfig>,
    pub request_id: Uuid,
}

/// Per-task entry inside the status maps and the `task_status` field of
/// the overall-status response.
#[derive(Debug, Clone, Serialize)]
pub struct TaskStatusWire {
    pub task_name: String,
    pub status: String,
    pub enabled: bool,
    pub providers: Vec<String>,
    pub services: Vec<String>,
    pub events_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<syncd_shared::Event>>,
}

impl From<TaskStatusView> for TaskStatusWire {
    fn from(view: TaskStatusView) -> Self {
        Self {
            task_name: view.task_name,
            status: view.status.as_str().to_string(),
            enabled: view.enabled,
            providers: view.providers,
            services: view.services,
            events_url: view.events_url,
            events: view.events,
        }
    }
}

/// `GET /v1/status/tasks[/{name}]` response: a map keyed by task name.
pub type TaskStatusMap = HashMap<String, TaskStatusWire>;

#[must_use]
pub fn task_status_map(views: Vec<TaskStatusView>) -> TaskStatusMap {
    views
        .into_iter()
        .map(|v| (v.task_name.clone(), TaskStatusWire::from(v)))
        .collect()
}

/// `{"task_summary": {"status": {...}, "enabled": {"true": n, "false": n}}}`.
#[derive(Debug, Clone, Serialize)]
pub struct OverallStatusEnvelope {
    pub task_summary: TaskSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    pub status: StatusCounts,
    pub enabled: EnabledCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCounts {
    pub successful: u32,
    pub errored: u32,
    pub critical: u32,
    pub unknown: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnabledCounts {
    #[serde(rename = "true")]
    pub enabled_true: u32,
    #[serde(rename = "false")]
    pub enabled_false: u32,
}

impl From<OverallStatus> for OverallStatusEnvelope {
    fn from(s: OverallStatus) -> Self {
        Self {
            task_summary: TaskSummary {
                status: StatusCounts {
                    successful: s.successful,
                    errored: s.errored,
                    critical: s.critical,
                    unknown: s.unknown,
                },
                enabled: EnabledCounts {
                    enabled_true: s.enabled_true,
                    enabled_false: s.enabled_false,
                },
            },
        }
    }
}

/// `GET /v1/health` response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthEnvelope {
    pub status: String,
    pub request_id: Uuid,
}
