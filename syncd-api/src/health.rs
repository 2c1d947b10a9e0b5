//! # Health Evaluation
//!
//! Evaluates daemon health without blocking the request hot path. A
//! background task calls [`evaluate_health`] on an interval and publishes
//! the result behind the health endpoint's own `RwLock` so health probes
//! never contend with lifecycle traffic; the handler only ever reads the
//! cached snapshot.

use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::context::RequestContext;
use crate::controller::Controller;

/// Cached result of the most recent health evaluation.
#[derive(Debug, Clone)]
pub struct HealthSnapshot {
    pub evaluated: bool,
    pub healthy: bool,
    pub last_check_duration_ms: u64,
    pub error_message: Option<String>,
}

impl Default for HealthSnapshot {
    fn default() -> Self {
        Self {
            evaluated: false,
            healthy: true,
            last_check_duration_ms: 0,
            error_message: None,
        }
    }
}

/// Evaluate health by confirming the controller collaborator is reachable
/// within `query_timeout`. A driver-listing call stands in for the "SELECT
/// 1"-style lightweight liveness query a background evaluator would issue
/// against a database pool.
pub async fn evaluate_health(
    controller: &dyn Controller,
    ctx: &RequestContext,
    query_timeout: Duration,
) -> HealthSnapshot {
    let start = Instant::now();

    match timeout(query_timeout, controller.driver_names(ctx)).await {
        Ok(Ok(_)) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            debug!(duration_ms, "health check successful");
            HealthSnapshot {
                evaluated: true,
                healthy: true,
                last_check_duration_ms: duration_ms,
                error_message: None,
            }
        }
        Ok(Err(e)) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            warn!(error = %e, duration_ms, "health check failed");
            HealthSnapshot {
                evaluated: true,
                healthy: false,
                last_check_duration_ms: duration_ms,
                error_message: Some(e.message()),
            }
        }
        Err(_elapsed) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            warn!(timeout_ms = query_timeout.as_millis() as u64, "health check timed out");
            HealthSnapshot {
                evaluated: true,
                healthy: false,
                last_check_duration_ms: duration_ms,
                error_message: Some(format!(
                    "health check timed out after {}ms",
                    query_timeout.as_millis()
                )),
            }
        }
    }
}

/// Spawn the background evaluator loop. Returns the join handle so the
/// caller can abort it during graceful shutdown.
pub fn spawn_evaluator(
    controller: crate::controller::SharedController,
    snapshot: std::sync::Arc<RwLock<HealthSnapshot>>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let ctx = RequestContext::new(
                syncd_shared::RequestId::new(),
                tracing::info_span!("health_evaluator"),
            );
            let result = evaluate_health(controller.as_ref(), &ctx, Duration::from_secs(2)).await;
            *snapshot.write().await = result;
        }
    })
}
