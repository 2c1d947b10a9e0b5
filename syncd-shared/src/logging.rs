//! # Tracing Initialization
//!
//! Sets up the process-wide `tracing` subscriber. Every request-scoped
//! logger used by `syncd-api`'s middleware chain is a child span of
//! whatever this installs, so this must run before the listener starts
//! accepting connections.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global tracing subscriber from `RUST_LOG`, defaulting to
/// `info` when unset. Safe to call once per process; subsequent calls are
/// ignored (mirrors `tracing_subscriber`'s own `try_init` semantics).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Initialize tracing with structured JSON output, used by production
/// deployments that ship logs to a collector rather than a terminal.
pub fn init_tracing_json() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .json()
        .with_current_span(true)
        .try_init();
}
