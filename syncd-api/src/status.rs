//! # Status Aggregator
//!
//! Derives per-task and cluster-wide status from bounded event history and
//! the driver registry. Implemented as a set of pure functions operating on
//! collaborator snapshots — no internal mutable state of its own; each
//! function takes its collaborators as parameters and returns a value type
//! rather than owning state.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use syncd_shared::{Event, SyncError, SyncResult, TaskConfigSnapshot};

use crate::context::RequestContext;
use crate::controller::Controller;

/// The four possible derived statuses for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DerivedStatus {
    Successful,
    Errored,
    Critical,
    Unknown,
}

impl DerivedStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Successful => "successful",
            Self::Errored => "errored",
            Self::Critical => "critical",
            Self::Unknown => "unknown",
        }
    }

    /// Parse the `status` query parameter, case-insensitively, accepting
    /// only the four known values.
    ///
    /// # Errors
    /// Returns `SyncError::BadRequest` for anything else.
    pub fn parse(value: &str) -> SyncResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "successful" => Ok(Self::Successful),
            "errored" => Ok(Self::Errored),
            "critical" => Ok(Self::Critical),
            "unknown" => Ok(Self::Unknown),
            other => Err(SyncError::bad_request(format!(
                "unknown status filter {other:?}, expected one of successful, errored, critical, unknown"
            ))),
        }
    }
}

impl fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derive a single task's status from its events, newest-first:
/// - no events -> `Unknown`
/// - newest event succeeded -> `Successful`
/// - newest event failed, exactly one failure in the window -> `Errored`
/// - newest event failed, more than one failure in the window -> `Critical`
#[must_use]
pub fn derive_task_status(events_newest_first: &[Event]) -> DerivedStatus {
    let Some(newest) = events_newest_first.first() else {
        return DerivedStatus::Unknown;
    };

    if newest.success {
        return DerivedStatus::Successful;
    }

    let failures = events_newest_first.iter().filter(|e| !e.success).count();
    if failures > 1 {
        DerivedStatus::Critical
    } else {
        DerivedStatus::Errored
    }
}

/// A fully-assembled per-task status view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusView {
    pub task_name: String,
    pub status: DerivedStatus,
    pub enabled: bool,
    pub providers: Vec<String>,
    pub services: Vec<String>,
    pub events_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<Event>>,
}

fn union_config(events: &[Event]) -> TaskConfigSnapshot {
    let mut providers = Vec::new();
    let mut services = Vec::new();
    for event in events {
        for p in &event.config.providers {
            if !providers.contains(p) {
                providers.push(p.clone());
            }
        }
        for s in &event.config.services {
            if !services.contains(s) {
                services.push(s.clone());
            }
        }
    }
    TaskConfigSnapshot { providers, services }
}

fn events_url(name: &str) -> String {
    format!("/v1/status/tasks/{name}")
}

/// Status for one named task.
///
/// Resolution order: if events exist, return the derived view; if only a
/// driver exists, return `unknown`; otherwise `not-found`. A named task
/// with neither events nor a driver is always `not-found` — never a 200
/// with an empty map.
///
/// # Errors
/// Propagates collaborator errors and returns `SyncError::NotFound` when
/// the task resolves to neither events nor a driver.
pub async fn task_status(
    controller: &dyn Controller,
    ctx: &RequestContext,
    name: &str,
    include_events: bool,
) -> SyncResult<TaskStatusView> {
    match controller.events(ctx, Some(name)).await {
        Ok(map) => {
            let events = map.get(name).cloned().unwrap_or_default();
            let enabled = controller
                .task(ctx, name)
                .await
                .map(|t| t.enabled)
                .unwrap_or(false);
            let snapshot = union_config(&events);
            Ok(TaskStatusView {
                task_name: name.to_string(),
                status: derive_task_status(&events),
                enabled,
                providers: snapshot.providers,
                services: snapshot.services,
                events_url: events_url(name),
                events: include_events.then_some(events),
            })
        }
        Err(e) if e.category() == "not-found" => {
            let drivers = controller.driver_names(ctx).await?;
            if drivers.iter().any(|d| d == name) {
                let enabled = controller
                    .task(ctx, name)
                    .await
                    .map(|t| t.enabled)
                    .unwrap_or(false);
                Ok(TaskStatusView {
                    task_name: name.to_string(),
                    status: DerivedStatus::Unknown,
                    enabled,
                    providers: vec![],
                    services: vec![],
                    events_url: events_url(name),
                    events: include_events.then_some(vec![]),
                })
            } else {
                Err(SyncError::not_found(format!(
                    "task '{name}' has neither events nor a driver"
                )))
            }
        }
        Err(e) => Err(e),
    }
}

/// Status for every known task, unioning the event-keyed set with the
/// driver-keyed set and applying the optional status filter.
///
/// # Errors
/// Propagates collaborator errors.
pub async fn all_task_statuses(
    controller: &dyn Controller,
    ctx: &RequestContext,
    filter: Option<DerivedStatus>,
    include_events: bool,
) -> SyncResult<Vec<TaskStatusView>> {
    let events_map = controller.events(ctx, None).await?;
    let drivers = controller.driver_names(ctx).await?;
    let tasks = controller.tasks(ctx).await?;
    let enabled_by_name: HashMap<&str, bool> =
        tasks.iter().map(|t| (t.name.as_str(), t.enabled)).collect();

    let mut names: Vec<String> = events_map.keys().cloned().collect();
    for driver in &drivers {
        if !names.contains(driver) {
            names.push(driver.clone());
        }
    }
    names.sort();

    let mut views = Vec::with_capacity(names.len());
    for name in names {
        let events = events_map.get(&name).cloned().unwrap_or_default();
        let status = derive_task_status(&events);
        if let Some(filter) = filter {
            if status != filter {
                continue;
            }
        }
        let snapshot = union_config(&events);
        views.push(TaskStatusView {
            task_name: name.clone(),
            status,
            enabled: enabled_by_name.get(name.as_str()).copied().unwrap_or(false),
            providers: snapshot.providers,
            services: snapshot.services,
            events_url: events_url(&name),
            events: include_events.then_some(events),
        });
    }
    Ok(views)
}

/// Cluster-wide status histogram: derived-status counts across every task
/// plus enabled/disabled driver counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallStatus {
    pub successful: u32,
    pub errored: u32,
    pub critical: u32,
    pub unknown: u32,
    pub enabled_true: u32,
    pub enabled_false: u32,
}

/// Compute the overall status histogram.
///
/// # Errors
/// Propagates collaborator errors.
pub async fn overall_status(
    controller: &dyn Controller,
    ctx: &RequestContext,
) -> SyncResult<OverallStatus> {
    let views = all_task_statuses(controller, ctx, None, false).await?;
    let drivers = controller.tasks(ctx).await?;

    let mut out = OverallStatus::default();
    for view in &views {
        match view.status {
            DerivedStatus::Successful => out.successful += 1,
            DerivedStatus::Errored => out.errored += 1,
            DerivedStatus::Critical => out.critical += 1,
            DerivedStatus::Unknown => out.unknown += 1,
        }
    }
    for driver in &drivers {
        if driver.enabled {
            out.enabled_true += 1;
        } else {
            out.enabled_false += 1;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn evt(success: bool) -> Event {
        Event {
            task_name: "t".to_string(),
            start_time: Utc::now(),
            end_time: Utc::now(),
            success,
            error_message: None,
            config: TaskConfigSnapshot::default(),
        }
    }

    #[test]
    fn no_events_is_unknown() {
        assert_eq!(derive_task_status(&[]), DerivedStatus::Unknown);
    }

    #[test]
    fn newest_success_is_successful() {
        assert_eq!(derive_task_status(&[evt(true)]), DerivedStatus::Successful);
    }

    #[test]
    fn single_trailing_failure_is_errored() {
        // newest-first: [false, true, true, true]
        let events = vec![evt(false), evt(true), evt(true), evt(true)];
        assert_eq!(derive_task_status(&events), DerivedStatus::Errored);
    }

    #[test]
    fn multiple_failures_with_newest_failed_is_critical() {
        let events = vec![evt(false), evt(false), evt(true)];
        assert_eq!(derive_task_status(&events), DerivedStatus::Critical);
    }

    #[test]
    fn status_filter_is_case_insensitive() {
        assert_eq!(DerivedStatus::parse("CRITICAL").unwrap(), DerivedStatus::Critical);
        assert_eq!(DerivedStatus::parse("Successful").unwrap(), DerivedStatus::Successful);
        assert!(DerivedStatus::parse("nonsense").is_err());
    }

    #[tokio::test]
    async fn scenario_overall_status_histogram() {
        use crate::controller::InMemoryController;
        use syncd_shared::task::Condition;
        use tracing::Span;

        let controller = InMemoryController::new();
        let ctx = RequestContext::new(syncd_shared::RequestId::new(), Span::none());

        let mk = |name: &str, enabled: bool| syncd_shared::TaskConfig {
            name: name.to_string(),
            module: "m".to_string(),
            condition: Condition::Services {
                names: vec!["api".to_string()],
                datacenter: None,
                namespace: None,
                filter: None,
                cts_user_defined_meta: Default::default(),
            },
            description: None,
            enabled,
            providers: vec![],
            variables: Default::default(),
            version: None,
            buffer_period: None,
            module_input: None,
            terraform_cloud_workspace: None,
        };

        controller.task_create(&ctx, mk("successful_task", true)).await.unwrap();
        controller.push_event("successful_task", evt(true)).await;

        controller.task_create(&ctx, mk("errored_task", true)).await.unwrap();
        for s in [false, true, true, true] {
            controller.push_event("errored_task", evt(s)).await;
        }

        controller.task_create(&ctx, mk("critical_task_1", true)).await.unwrap();
        for s in [false, false, true] {
            controller.push_event("critical_task_1", evt(s)).await;
        }

        controller.task_create(&ctx, mk("critical_task_2", true)).await.unwrap();
        for s in [false, false, true] {
            controller.push_event("critical_task_2", evt(s)).await;
        }

        controller.task_create(&ctx, mk("disabled_no_events", false)).await.unwrap();

        let overall = overall_status(&controller, &ctx).await.unwrap();
        assert_eq!(overall.successful, 1);
        assert_eq!(overall.errored, 1);
        assert_eq!(overall.critical, 2);
        assert_eq!(overall.unknown, 1);
        assert_eq!(overall.enabled_true, 4);
        assert_eq!(overall.enabled_false, 1);
    }

    #[tokio::test]
    async fn scenario_single_task_status_with_events() {
        use crate::controller::InMemoryController;
        use syncd_shared::task::Condition;
        use tracing::Span;

        let controller = InMemoryController::new();
        let ctx = RequestContext::new(syncd_shared::RequestId::new(), Span::none());
        let cfg = syncd_shared::TaskConfig {
            name: "task_b".to_string(),
            module: "m".to_string(),
            condition: Condition::Services {
                names: vec!["api".to_string()],
                datacenter: None,
                namespace: None,
                filter: None,
                cts_user_defined_meta: Default::default(),
            },
            description: None,
            enabled: true,
            providers: vec![],
            variables: Default::default(),
            version: None,
            buffer_period: None,
            module_input: None,
            terraform_cloud_workspace: None,
        };
        controller.task_create(&ctx, cfg).await.unwrap();
        for s in [false, false, true] {
            controller.push_event("task_b", evt(s)).await;
        }

        let view = task_status(&controller, &ctx, "task_b", true).await.unwrap();
        assert_eq!(view.status, DerivedStatus::Critical);
        assert_eq!(view.events.as_ref().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unknown_named_task_with_no_driver_is_not_found() {
        use crate::controller::InMemoryController;
        use tracing::Span;

        let controller = InMemoryController::new();
        let ctx = RequestContext::new(syncd_shared::RequestId::new(), Span::none());
        let err = task_status(&controller, &ctx, "ghost", false).await.unwrap_err();
        assert_eq!(err.category(), "not-found");
    }
}
