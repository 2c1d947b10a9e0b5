//! # syncd-shared
//!
//! Domain types, configuration, and ambient infrastructure (logging, error
//! taxonomy) shared by the sync daemon's control-plane API server
//! (`syncd-api`) and its typed client (`syncd-client`).

pub mod config;
pub mod duration;
pub mod error;
pub mod event;
pub mod logging;
pub mod task;

pub use error::{SyncError, SyncResult};
pub use event::{Event, EventHistory, TaskConfigSnapshot, EVENT_RETENTION_LIMIT};
pub use task::{BufferPeriod, Condition, ModuleInput, TaskConfig, TerraformCloudWorkspace};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A per-request UUID-v4, generated at the transport edge and threaded
/// through the middleware chain, every collaborator call, and the
/// response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Run-option dispatch for create/update: absent, `now`, or `inspect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOption {
    Now,
    Inspect,
}

impl RunOption {
    /// Parse the `run` query parameter, rejecting any value besides
    /// `now`/`inspect` (case-sensitive, per the wire contract).
    ///
    /// # Errors
    /// Returns `SyncError::BadRequest` for any other value.
    pub fn parse(value: &str) -> SyncResult<Self> {
        match value {
            "now" => Ok(Self::Now),
            "inspect" => Ok(Self::Inspect),
            other => Err(SyncError::bad_request(format!(
                "unknown run option {other:?}, expected 'now' or 'inspect'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_option_parses_known_values() {
        assert_eq!(RunOption::parse("now").unwrap(), RunOption::Now);
        assert_eq!(RunOption::parse("inspect").unwrap(), RunOption::Inspect);
    }

    #[test]
    fn run_option_rejects_unknown_values() {
        assert!(RunOption::parse("later").is_err());
    }

    #[test]
    fn request_id_displays_as_uuid() {
        let id = RequestId::new();
        assert_eq!(id.to_string(), id.0.to_string());
    }
}
