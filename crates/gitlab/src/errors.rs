//! Translation of GitLab HTTP failures into structured [`HostingError`]s.
//!
//! This is the only place that looks at response bodies to decide what went
//! wrong. Callers above the adapter match on [`HostingErrorKind`] alone.

use course::{HostingAction, HostingError, HostingErrorKind};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Field-level validation message GitLab uses for name and path collisions.
const TAKEN: &str = "has already been taken";

/// Errors raised while constructing a [`crate::GitlabClient`].
#[derive(Debug, Error)]
pub enum GitlabError {
    #[error("Invalid GitLab URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Builds the [`HostingError`] for a non-success response.
pub(crate) fn from_response(action: HostingAction, status: StatusCode, body: &str) -> HostingError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let kind = classify(status, parsed.as_ref());
    let message = match parsed.as_ref().and_then(describe) {
        Some(message) => format!("{status}: {message}"),
        None if body.is_empty() => status.to_string(),
        None => format!("{status}: {}", truncate(body, 200)),
    };
    HostingError::new(kind, action, message)
}

/// Builds the [`HostingError`] for a request that never produced a response.
pub(crate) fn from_transport(action: HostingAction, error: &reqwest::Error) -> HostingError {
    HostingError::new(HostingErrorKind::Other, action, format!("transport error: {error}"))
}

pub(crate) fn classify(status: StatusCode, body: Option<&Value>) -> HostingErrorKind {
    match status.as_u16() {
        401 | 403 => HostingErrorKind::PermissionDenied,
        404 => HostingErrorKind::NotFound,
        409 => HostingErrorKind::AlreadyExists,
        400 | 422 if body.is_some_and(reports_existing) => HostingErrorKind::AlreadyExists,
        _ => HostingErrorKind::Other,
    }
}

/// Whether a 400/422 body describes a collision with an existing object.
///
/// Collisions arrive as field errors (`{"message": {"path": ["has already
/// been taken"]}}`), as a flattened string (`"Failed to save group
/// {:path=>[\"has already been taken\"]}"`), as a list of such strings, or,
/// for tags, as a plain message ending in `already exists`.
fn reports_existing(body: &Value) -> bool {
    match body.get("message") {
        Some(Value::Object(fields)) => fields.values().any(mentions_taken),
        Some(message) => mentions_taken(message),
        None => false,
    }
}

fn mentions_taken(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains(TAKEN) || s.ends_with("already exists"),
        Value::Array(items) => items.iter().any(mentions_taken),
        _ => false,
    }
}

/// Flattens GitLab's `message` / `error` body fields into one line.
fn describe(body: &Value) -> Option<String> {
    if let Some(error) = body.get("error").and_then(Value::as_str) {
        return Some(error.to_string());
    }
    match body.get("message")? {
        Value::String(message) => Some(message.clone()),
        Value::Object(fields) => {
            let parts: Vec<String> = fields
                .iter()
                .map(|(field, errors)| match errors {
                    Value::Array(items) => {
                        let items: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                        format!("{field} {}", items.join(", "))
                    }
                    other => format!("{field} {other}"),
                })
                .collect();
            Some(parts.join("; "))
        }
        other => Some(other.to_string()),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((index, _)) => &s[..index],
        None => s,
    }
}
