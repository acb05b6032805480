//! Reply-text extraction from downstream responses.
//!
//! Downstream APIs are free-form, so the reply text is found heuristically:
//! a fixed list of well-known field names is tried first, then any
//! non-blank top-level string value is accepted. The whole policy lives
//! here so it can be audited and replaced without touching the workflow.

use serde_json::Value;

/// Field names tried in order when looking for the reply text.
pub const REPLY_TEXT_FIELDS: &[&str] = &[
    "text", "response", "message", "reply", "answer", "content", "output",
];

/// Extract the reply text from a downstream response body.
///
/// Only JSON objects are searched. A preferred field wins when it holds a
/// non-empty value: strings are taken as they are, other values (numbers,
/// arrays, nested objects) are rendered as JSON text. Otherwise the first
/// top-level string that is not blank wins, in key order. Returns `None`
/// when nothing qualifies.
pub fn extract_reply_text(body: &Value) -> Option<String> {
    let object = body.as_object()?;

    let preferred = REPLY_TEXT_FIELDS
        .iter()
        .filter_map(|field| object.get(*field))
        .find(|value| is_present(value))
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });

    preferred.or_else(|| {
        object.values().find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        })
    })
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
