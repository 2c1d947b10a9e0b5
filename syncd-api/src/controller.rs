//! # Controller Collaborator Contract
//!
//! The task driver registry and event store are owned and implemented
//! outside this crate's core; handlers reach them only through the
//! `Controller` trait. `InMemoryController` is a reference implementation
//! used by the integration tests and the standalone demo binary — it is
//! not the production driver/event-store implementation, which is
//! expected to be supplied by the embedding application.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use syncd_shared::{Event, EventHistory, RunOption, SyncError, SyncResult, TaskConfig};

use crate::context::RequestContext;

/// The result of a dry-run (`TaskInspect`/`TaskUpdate` with `run=inspect`).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InspectPlan {
    pub plan: String,
    pub changes_present: bool,
}

/// The collaborator interface between this crate's core and the driver
/// registry/event store it does not own.
///
/// Implementations own the driver registry and event store exclusively;
/// the core never caches their results across requests and never
/// synchronizes internally beyond the lifecycle lock — any concurrency
/// safety beyond that is this trait's responsibility.
#[async_trait]
pub trait Controller: Send + Sync {
    async fn task(&self, ctx: &RequestContext, name: &str) -> SyncResult<TaskConfig>;

    async fn tasks(&self, ctx: &RequestContext) -> SyncResult<Vec<TaskConfig>>;

    async fn task_create(&self, ctx: &RequestContext, cfg: TaskConfig) -> SyncResult<TaskConfig>;

    async fn task_create_and_run(
        &self,
        ctx: &RequestContext,
        cfg: TaskConfig,
    ) -> SyncResult<TaskConfig>;

    async fn task_inspect(&self, ctx: &RequestContext, cfg: TaskConfig) -> SyncResult<InspectPlan>;

    async fn task_update(
        &self,
        ctx: &RequestContext,
        name: &str,
        enabled: bool,
        run: Option<RunOption>,
    ) -> SyncResult<InspectPlan>;

    async fn task_delete(&self, ctx: &RequestContext, name: &str) -> SyncResult<()>;

    /// Events for one task, or for every task when `name` is `None`.
    async fn events(
        &self,
        ctx: &RequestContext,
        name: Option<&str>,
    ) -> SyncResult<HashMap<String, Vec<Event>>>;

    /// Every task name currently backed by a driver, regardless of event
    /// history. Used by the status aggregator's driver-union semantics.
    async fn driver_names(&self, ctx: &RequestContext) -> SyncResult<Vec<String>>;
}

#[derive(Debug, Default)]
struct TaskEntry {
    config: TaskConfig,
    history: EventHistory,
    running: bool,
}

/// In-memory reference `Controller`. Registers tasks in a `HashMap` guarded
/// by a single `RwLock` — this collaborator-internal lock is a second,
/// narrower one scoped only to the map itself, independent of the
/// handler-layer lifecycle lock.
#[derive(Debug, Default)]
pub struct InMemoryController {
    tasks: RwLock<HashMap<String, TaskEntry>>,
}

impl InMemoryController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
        }
    }

    /// Test/demo helper: mark a task as currently executing, used to
    /// exercise the delete-while-running conflict path.
    pub async fn set_running(&self, name: &str, running: bool) {
        if let Some(entry) = self.tasks.write().await.get_mut(name) {
            entry.running = running;
        }
    }

    /// Test/demo helper: append a synthetic event directly, bypassing the
    /// run pipeline.
    pub async fn push_event(&self, name: &str, event: Event) {
        if let Some(entry) = self.tasks.write().await.get_mut(name) {
            entry.history.push(event);
        }
    }

    fn render_plan(cfg: &TaskConfig) -> InspectPlan {
        InspectPlan {
            plan: format!(
                "+ task \"{}\" ({}) -> module {}",
                cfg.name,
                cfg.condition.kind(),
                cfg.module
            ),
            changes_present: true,
        }
    }
}

#[async_trait]
impl Controller for InMemoryController {
    async fn task(&self, _ctx: &RequestContext, name: &str) -> SyncResult<TaskConfig> {
        self.tasks
            .read()
            .await
            .get(name)
            .map(|e| e.config.clone())
            .ok_or_else(|| SyncError::not_found(format!("task '{name}' does not exist")))
    }

    async fn tasks(&self, _ctx: &RequestContext) -> SyncResult<Vec<TaskConfig>> {
        Ok(self
            .tasks
            .read()
            .await
            .values()
            .map(|e| e.config.clone())
            .collect())
    }

    async fn task_create(&self, _ctx: &RequestContext, cfg: TaskConfig) -> SyncResult<TaskConfig> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&cfg.name) {
            return Err(SyncError::bad_request(format!(
                "task with name {} already exists",
                cfg.name
            )));
        }
        tasks.insert(
            cfg.name.clone(),
            TaskEntry {
                config: cfg.clone(),
                history: EventHistory::new(),
                running: false,
            },
        );
        Ok(cfg)
    }

    async fn task_create_and_run(
        &self,
        _ctx: &RequestContext,
        cfg: TaskConfig,
    ) -> SyncResult<TaskConfig> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&cfg.name) {
            return Err(SyncError::bad_request(format!(
                "task with name {} already exists",
                cfg.name
            )));
        }
        let now = chrono::Utc::now();
        let mut history = EventHistory::new();
        history.push(Event {
            task_name: cfg.name.clone(),
            start_time: now,
            end_time: now,
            success: true,
            error_message: None,
            config: syncd_shared::TaskConfigSnapshot {
                providers: cfg.providers.clone(),
                services: vec![],
            },
        });
        tasks.insert(
            cfg.name.clone(),
            TaskEntry {
                config: cfg.clone(),
                history,
                running: false,
            },
        );
        Ok(cfg)
    }

    async fn task_inspect(
        &self,
        _ctx: &RequestContext,
        cfg: TaskConfig,
    ) -> SyncResult<InspectPlan> {
        // Deliberately does not touch `self.tasks`: dry-run leaves the
        // registry and event store unchanged.
        Ok(Self::render_plan(&cfg))
    }

    async fn task_update(
        &self,
        _ctx: &RequestContext,
        name: &str,
        enabled: bool,
        run: Option<RunOption>,
    ) -> SyncResult<InspectPlan> {
        let mut tasks = self.tasks.write().await;
        let entry = tasks
            .get_mut(name)
            .ok_or_else(|| SyncError::not_found(format!("task '{name}' does not exist")))?;

        let plan = Self::render_plan(&{
            let mut preview = entry.config.clone();
            preview.enabled = enabled;
            preview
        });

        if !matches!(run, Some(RunOption::Inspect)) {
            entry.config.enabled = enabled;
            if matches!(run, Some(RunOption::Now)) {
                let now = chrono::Utc::now();
                entry.history.push(Event {
                    task_name: name.to_string(),
                    start_time: now,
                    end_time: now,
                    success: true,
                    error_message: None,
                    config: syncd_shared::TaskConfigSnapshot {
                        providers: entry.config.providers.clone(),
                        services: vec![],
                    },
                });
            }
        }

        Ok(plan)
    }

    async fn task_delete(&self, _ctx: &RequestContext, name: &str) -> SyncResult<()> {
        let mut tasks = self.tasks.write().await;
        match tasks.get(name) {
            Some(entry) if entry.running => Err(SyncError::conflict(format!(
                "task '{name}' is currently running and cannot be deleted"
            ))),
            Some(_) => {
                tasks.remove(name);
                Ok(())
            }
            None => Err(SyncError::not_found(format!("task '{name}' does not exist"))),
        }
    }

    async fn events(
        &self,
        _ctx: &RequestContext,
        name: Option<&str>,
    ) -> SyncResult<HashMap<String, Vec<Event>>> {
        let tasks = self.tasks.read().await;
        match name {
            Some(name) => {
                let entry = tasks
                    .get(name)
                    .ok_or_else(|| SyncError::not_found(format!("task '{name}' does not exist")))?;
                let mut map = HashMap::new();
                map.insert(name.to_string(), entry.history.as_slice_newest_first());
                Ok(map)
            }
            None => Ok(tasks
                .iter()
                .map(|(name, entry)| (name.clone(), entry.history.as_slice_newest_first()))
                .collect()),
        }
    }

    async fn driver_names(&self, _ctx: &RequestContext) -> SyncResult<Vec<String>> {
        Ok(self.tasks.read().await.keys().cloned().collect())
    }
}

/// Shared handle to a `Controller`, cheaply clonable into handler state.
pub type SharedController = Arc<dyn Controller>;
