//! # Query Parameter Parsing
//!
//! `axum`'s default `Query` extractor silently keeps the last value for a
//! repeated key; duplicate keys for the recognized parameters must be
//! rejected as `bad-request`. Parsed by hand for that reason.

use std::collections::HashMap;

use syncd_shared::SyncError;

/// The recognized query parameters across every status/lifecycle route.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pub run: Option<String>,
    pub status: Option<String>,
    pub include: Option<String>,
}

/// Parse a raw query string (without the leading `?`), rejecting
/// duplicate occurrences of `run`, `status`, or `include`.
///
/// # Errors
/// Returns `SyncError::BadRequest` if any recognized key appears more than
/// once.
pub fn parse_query(raw: Option<&str>) -> Result<QueryParams, SyncError> {
    let raw = match raw {
        Some(r) if !r.is_empty() => r,
        _ => return Ok(QueryParams::default()),
    };

    let mut seen: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        seen.entry(key.into_owned()).or_default().push(value.into_owned());
    }

    let mut take = |name: &str| -> Result<Option<String>, SyncError> {
        match seen.remove(name) {
            None => Ok(None),
            Some(values) if values.len() == 1 => Ok(Some(values.into_iter().next().unwrap())),
            Some(_) => Err(SyncError::bad_request(format!(
                "query parameter '{name}' may not be repeated"
            ))),
        }
    };

    Ok(QueryParams {
        run: take("run")?,
        status: take("status")?,
        include: take("include")?,
    })
}

impl QueryParams {
    #[must_use]
    pub fn include_events(&self) -> bool {
        self.include.as_deref() == Some("events")
    }
}
