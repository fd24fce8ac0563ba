//! # Model Output Extraction
//!
//! Models are asked to answer with a bare JSON object, but they regularly wrap
//! the answer in markdown fences or surround it with prose. This module strips
//! those artifacts and locates the embedded payload. It is a heuristic, not a
//! parser: the returned span may still be invalid JSON, and callers must treat
//! a failed parse as an ordinary outcome.

use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;
use tracing::warn;

/// The marker stored in the fallback mapping when the model output cannot be parsed.
pub const PARSE_FAILURE_MARKER: &str = "Failed to parse JSON";

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

// Greedy: from the first `{` to the last `}`, across newlines.
static BRACE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("brace span pattern is valid"));

/// Strips markdown fences from `text` and returns the span from the first `{`
/// to the last `}`.
///
/// If no such span exists, the fence-stripped text is returned trimmed.
/// Re-applying is a no-op only when the result is a brace span; fence-only
/// remnants such as "``` ```json" shrink again on a second pass.
pub fn extract_payload(text: &str) -> String {
    let mut text = text.trim();

    if let Some(rest) = text.strip_prefix(JSON_FENCE) {
        text = rest;
    }
    // Checked independently of the tagged opener above.
    if let Some(rest) = text.strip_prefix(FENCE) {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest;
    }

    match BRACE_SPAN.find(text) {
        Some(m) => m.as_str().to_string(),
        None => text.trim().to_string(),
    }
}

/// Turns raw model output into a specifications mapping.
///
/// On success the parsed JSON object is returned. Anything else (invalid JSON,
/// or valid JSON that is not an object) yields the fallback mapping
/// `{"error": "Failed to parse JSON", "raw_text": <raw>}`, where `raw` is the
/// untouched model output rather than the extracted span.
pub fn parse_specifications(raw: &str) -> Value {
    let payload = extract_payload(raw);
    match serde_json::from_str::<Value>(&payload) {
        Ok(value @ Value::Object(_)) => value,
        Ok(other) => {
            warn!(
                "Failed to parse JSON: expected an object, got {}",
                json_kind(&other)
            );
            fallback_specifications(raw)
        }
        Err(e) => {
            warn!("Failed to parse JSON: {e}");
            fallback_specifications(raw)
        }
    }
}

/// Builds the mapping recorded when the model output is not a JSON object.
pub fn fallback_specifications(raw: &str) -> Value {
    json!({
        "error": PARSE_FAILURE_MARKER,
        "raw_text": raw,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
