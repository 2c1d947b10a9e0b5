//! # Published JSON Schemas
//!
//! The schemas mutating endpoints validate request bodies against. Kept as
//! inline JSON literals rather than files on disk so the schema ships with
//! the binary and can't drift from what the decoder in `wire.rs` actually
//! accepts.

use std::sync::OnceLock;

use jsonschema::JSONSchema;
use serde_json::Value;

use syncd_shared::SyncError;

const TASK_CONDITION_SCHEMA: &str = r#"
{
  "type": "object",
  "minProperties": 1,
  "maxProperties": 1,
  "properties": {
    "services": { "type": "object" },
    "catalog_services": { "type": "object" },
    "consul_kv": { "type": "object" },
    "schedule": { "type": "object" }
  },
  "additionalProperties": false
}
"#;

const CREATE_TASK_SCHEMA: &str = r#"
{
  "type": "object",
  "required": ["task"],
  "properties": {
    "task": {
      "type": "object",
      "required": ["name", "module", "condition"],
      "properties": {
        "name": { "type": "string", "minLength": 1, "pattern": "^[^/]+$" },
        "module": { "type": "string", "minLength": 1 },
        "condition": {}
      }
    }
  }
}
"#;

const UPDATE_TASK_SCHEMA: &str = r#"
{
  "type": "object",
  "required": ["enabled"],
  "properties": {
    "enabled": { "type": "boolean" }
  },
  "additionalProperties": false
}
"#;

fn compile(schema_json: &'static str) -> JSONSchema {
    let value: Value = serde_json::from_str(schema_json).expect("schema literal is valid JSON");
    JSONSchema::compile(Box::leak(Box::new(value)))
        .expect("schema literal compiles as a valid JSON Schema")
}

static CREATE_TASK: OnceLock<JSONSchema> = OnceLock::new();
static UPDATE_TASK: OnceLock<JSONSchema> = OnceLock::new();
static TASK_CONDITION: OnceLock<JSONSchema> = OnceLock::new();

fn create_task_schema() -> &'static JSONSchema {
    CREATE_TASK.get_or_init(|| compile(CREATE_TASK_SCHEMA))
}

fn update_task_schema() -> &'static JSONSchema {
    UPDATE_TASK.get_or_init(|| compile(UPDATE_TASK_SCHEMA))
}

fn task_condition_schema() -> &'static JSONSchema {
    TASK_CONDITION.get_or_init(|| compile(TASK_CONDITION_SCHEMA))
}

/// Which published schema a mutating request body must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    CreateTask,
    UpdateTask,
}

/// Validate a request body against its published schema, producing a
/// precise path-qualified `bad-request` message on failure.
///
/// # Errors
/// Returns `SyncError::BadRequest` if `body` is not valid JSON or fails
/// schema validation.
pub fn validate(kind: SchemaKind, body: &[u8]) -> Result<Value, SyncError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| SyncError::bad_request(format!("malformed JSON body: {e}")))?;

    let schema = match kind {
        SchemaKind::CreateTask => create_task_schema(),
        SchemaKind::UpdateTask => update_task_schema(),
    };

    if let Err(mut errors) = schema.validate(&value) {
        let first = errors.next();
        let message = match first {
            Some(e) => format!("schema validation failed at {}: {}", e.instance_path, e),
            None => "schema validation failed".to_string(),
        };
        return Err(SyncError::bad_request(message));
    }

    if kind == SchemaKind::CreateTask {
        if let Some(condition) = value.get("task").and_then(|t| t.get("condition")) {
            if let Err(mut errors) = task_condition_schema().validate(condition) {
                let message = errors
                    .next()
                    .map(|e| format!("task.condition: {e}"))
                    .unwrap_or_else(|| {
                        "task.condition must have exactly one discriminator".to_string()
                    });
                return Err(SyncError::bad_request(message));
            }
        }
    }

    Ok(value)
}
