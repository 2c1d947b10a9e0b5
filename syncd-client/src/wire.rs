//! # Response Shapes
//!
//! Mirrors the server's wire envelopes (`syncd_api::wire`) from the
//! client side. Kept as a separate, independent definition rather than a
//! shared dependency on `syncd-api` — the client should only know the wire
//! contract, not link against the server's handler crate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use syncd_shared::{Event, TaskConfig};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
    pub request_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunEnvelope {
    pub plan: String,
    pub changes_present: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskResponseEnvelope {
    #[serde(default)]
    pub task: Option<TaskConfig>,
    pub request_id: Uuid,
    #[serde(default)]
    pub run: Option<RunEnvelope>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TasksListEnvelope {
    pub tasks: Vec<TaskConfig>,
    pub request_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskStatusWire {
    pub task_name: String,
    pub status: String,
    pub enabled: bool,
    pub providers: Vec<String>,
    pub services: Vec<String>,
    pub events_url: String,
    #[serde(default)]
    pub events: Option<Vec<Event>>,
}

pub type TaskStatusMap = HashMap<String, TaskStatusWire>;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusCounts {
    pub successful: u32,
    pub errored: u32,
    pub critical: u32,
    pub unknown: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnabledCounts {
    #[serde(rename = "true")]
    pub enabled_true: u32,
    #[serde(rename = "false")]
    pub enabled_false: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskSummary {
    pub status: StatusCounts,
    pub enabled: EnabledCounts,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OverallStatusEnvelope {
    pub task_summary: TaskSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTaskRequest {
    pub task: TaskConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateTaskRequest {
    pub enabled: bool,
}
