//! # API State
//!
//! The `axum` `State` payload shared by every handler: a handle to the
//! `Controller` collaborator, the lifecycle readers-writer lock, and the
//! health snapshot's own independent lock.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::controller::SharedController;
use crate::health::HealthSnapshot;

/// Guards every mutating lifecycle endpoint (create/update/delete/dry-run)
/// with the writer side, and every read endpoint (get/list) with the
/// reader side. A single global lock, trading per-task concurrency for
/// simplicity on the assumption that mutation frequency is low.
pub type LifecycleLock = Arc<RwLock<()>>;

#[derive(Clone)]
pub struct ApiState {
    pub controller: SharedController,
    pub lifecycle: LifecycleLock,
    pub health: Arc<RwLock<HealthSnapshot>>,
}

impl ApiState {
    #[must_use]
    pub fn new(controller: SharedController) -> Self {
        Self {
            controller,
            lifecycle: Arc::new(RwLock::new(())),
            health: Arc::new(RwLock::new(HealthSnapshot::default())),
        }
    }
}

impl std::fmt::Debug for ApiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState").finish_non_exhaustive()
    }
}
