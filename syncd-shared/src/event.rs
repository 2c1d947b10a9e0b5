//! # Event History
//!
//! An `Event` records the outcome of one driver invocation. The event
//! store (an external collaborator) retains at most
//! [`EVENT_RETENTION_LIMIT`] events per task; this module provides the
//! bounded-ring helper the reference `InMemoryController` uses to enforce
//! that limit, plus the status-snapshot fields derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of events retained per task. The sixth insertion evicts
/// the oldest entry.
pub const EVENT_RETENTION_LIMIT: usize = 5;

/// A snapshot of the providers/services a task was configured with at the
/// time one driver invocation ran.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskConfigSnapshot {
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default)]
    pub services: Vec<String>,
}

/// One immutable record of a driver invocation's outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub task_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub success: bool,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub config: TaskConfigSnapshot,
}

/// Bounded, newest-first event history for a single task.
///
/// Wraps a `VecDeque` rather than a plain `Vec` so eviction of the oldest
/// entry on overflow is O(1); the front of the deque is always the newest
/// event.
#[derive(Debug, Clone, Default)]
pub struct EventHistory {
    events: VecDeque<Event>,
}

impl EventHistory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: VecDeque::with_capacity(EVENT_RETENTION_LIMIT),
        }
    }

    /// Record a new event, evicting the oldest if retention is exceeded.
    pub fn push(&mut self, event: Event) {
        self.events.push_front(event);
        while self.events.len() > EVENT_RETENTION_LIMIT {
            self.events.pop_back();
        }
    }

    /// Events newest-first.
    #[must_use]
    pub fn as_slice_newest_first(&self) -> Vec<Event> {
        self.events.iter().cloned().collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Union of providers/services across all retained events, used for
    /// `TaskStatus::providers`/`services`.
    #[must_use]
    pub fn union_config(&self) -> TaskConfigSnapshot {
        let mut providers = Vec::new();
        let mut services = Vec::new();
        for event in &self.events {
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
}
