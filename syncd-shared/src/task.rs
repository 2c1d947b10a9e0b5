//! # Task Configuration Model
//!
//! The internal (as opposed to wire) representation of a synchronization
//! task. `syncd-api::wire` maps this to and from the JSON request/response
//! shapes; this module only knows about the typed, already-validated
//! shape.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::duration::WireDuration;

/// One of the four triggering predicates a task can have. Exactly one
/// variant is ever present on a given task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Services {
        names: Vec<String>,
        #[serde(default)]
        datacenter: Option<String>,
        #[serde(default)]
        namespace: Option<String>,
        #[serde(default)]
        filter: Option<String>,
        #[serde(default)]
        cts_user_defined_meta: HashMap<String, String>,
    },
    CatalogServices {
        #[serde(default)]
        regexp: Option<String>,
        #[serde(default)]
        datacenter: Option<String>,
        #[serde(default)]
        namespace: Option<String>,
        #[serde(default)]
        node_meta: HashMap<String, String>,
    },
    ConsulKv {
        path: String,
        #[serde(default)]
        recurse: Option<bool>,
        #[serde(default)]
        datacenter: Option<String>,
        #[serde(default)]
        namespace: Option<String>,
    },
    Schedule {
        cron: String,
    },
}

impl Condition {
    /// The discriminator name as it appears on the wire (`"services"`, ...).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Services { .. } => "services",
            Self::CatalogServices { .. } => "catalog_services",
            Self::ConsulKv { .. } => "consul_kv",
            Self::Schedule { .. } => "schedule",
        }
    }
}

/// Additional inputs passed to a task's module beyond its triggering
/// condition. Only two of the four condition shapes are valid here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleInput {
    Services {
        names: Vec<String>,
        #[serde(default)]
        datacenter: Option<String>,
        #[serde(default)]
        namespace: Option<String>,
        #[serde(default)]
        filter: Option<String>,
        #[serde(default)]
        cts_user_defined_meta: HashMap<String, String>,
    },
    ConsulKv {
        path: String,
        #[serde(default)]
        recurse: Option<bool>,
        #[serde(default)]
        datacenter: Option<String>,
        #[serde(default)]
        namespace: Option<String>,
    },
}

impl ModuleInput {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Services { .. } => "services",
            Self::ConsulKv { .. } => "consul_kv",
        }
    }
}

/// Debounce window applied before a task runs in response to a change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BufferPeriod {
    pub enabled: bool,
    #[serde(default)]
    pub min: WireDuration,
    #[serde(default)]
    pub max: WireDuration,
}

impl Default for BufferPeriod {
    fn default() -> Self {
        Self {
            enabled: true,
            min: WireDuration::ZERO,
            max: WireDuration::ZERO,
        }
    }
}

/// Terraform Cloud workspace binding, present only for tasks backed by a
/// remote TFC workspace rather than local Terraform execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerraformCloudWorkspace {
    #[serde(default)]
    pub execution_mode: Option<String>,
    #[serde(default)]
    pub agent_pool_id: Option<String>,
    #[serde(default)]
    pub agent_pool_name: Option<String>,
}

/// A complete, validated task configuration.
///
/// Invariant: `name` is unique across the registry; this struct does not
/// enforce that on its own — the `Controller` collaborator does (create
/// rejects with `conflict` on a duplicate name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub name: String,
    pub module: String,
    pub condition: Condition,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default)]
    pub variables: HashMap<String, String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub buffer_period: Option<BufferPeriod>,
    #[serde(default)]
    pub module_input: Option<ModuleInput>,
    #[serde(default)]
    pub terraform_cloud_workspace: Option<TerraformCloudWorkspace>,
}

fn default_enabled() -> bool {
    true
}

/// Name-rule validation shared by the create/update path and the path
/// router (`/{name}` segments).
///
/// # Errors
/// Returns `Err` with a human-readable message if the name is empty or
/// contains a `/`.
pub fn validate_task_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("task name must not be empty".to_string());
    }
    if name.contains('/') {
        return Err(format!(
            "task name {name:?} must not contain '/', expected a single URL path segment"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task(name: &str) -> TaskConfig {
        TaskConfig {
            name: name.to_string(),
            module: "mod".to_string(),
            condition: Condition::Services {
                names: vec!["api".to_string()],
                datacenter: None,
                namespace: None,
                filter: None,
                cts_user_defined_meta: HashMap::new(),
            },
            description: None,
            enabled: true,
            providers: vec![],
            variables: HashMap::new(),
            version: None,
            buffer_period: None,
            module_input: None,
            terraform_cloud_workspace: None,
        }
    }

    #[test]
    fn condition_kind_matches_discriminator() {
        let task = sample_task("t");
        assert_eq!(task.condition.kind(), "services");
    }

    #[test]
    fn name_with_slash_is_rejected() {
        assert!(validate_task_name("bad/name").is_err());
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(validate_task_name("").is_err());
    }

    #[test]
    fn valid_name_passes() {
        assert!(validate_task_name("task_a").is_ok());
    }

    #[test]
    fn default_enabled_is_true() {
        assert!(default_enabled());
    }

    #[test]
    fn serde_round_trip_preserves_condition() {
        let task = sample_task("rt");
        let json = serde_json::to_string(&task).unwrap();
        let back: TaskConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(task, back);
    }
}
