//! Conversion of raw tool server results into agent-facing text

use crate::error::{Result, ToolError};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Debug;
use tracing::warn;

/// Turns any `tools/call` result into a single string.
///
/// Rules, first match wins:
/// 1. absent or `null` → `{"status":"success","data":null}`
/// 2. `{"content": [...]}` → segment texts joined by `\n`, pretty-printed when
///    the joined text is itself JSON; an empty array yields a
///    "No content returned" status object
/// 3. a plain string is returned unchanged
/// 4. anything else is pretty-printed JSON
///
/// Never fails: internal errors become `{"error":"Failed to extract result: ..."}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResultNormalizer;

impl ResultNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, result: Option<&Value>) -> String {
        match self.try_normalize(result) {
            Ok(text) => text,
            Err(e) => failure(e),
        }
    }

    /// Normalize an arbitrary serializable result
    pub fn normalize_serializable<T: Serialize + Debug>(&self, result: &T) -> String {
        match serde_json::to_value(result) {
            Ok(value) => self.normalize(Some(&value)),
            Err(e) => failure(
                ToolError::NormalizationFailed {
                    message: format!("{} ({:?})", e, result),
                }
                .into(),
            ),
        }
    }

    fn try_normalize(&self, result: Option<&Value>) -> Result<String> {
        let value = match result {
            None | Some(Value::Null) => {
                return Ok(serde_json::to_string(&json!({
                    "status": "success",
                    "data": null,
                }))?)
            }
            Some(value) => value,
        };

        if let Some(segments) = value.get("content").and_then(Value::as_array) {
            if value.get("isError").and_then(Value::as_bool) == Some(true) {
                warn!("Tool server flagged the result as an error");
            }
            return self.join_content(segments);
        }

        match value {
            Value::String(text) => Ok(text.clone()),
            other => Ok(serde_json::to_string_pretty(other)
                .unwrap_or_else(|_| format!("{:?}", other))),
        }
    }

    fn join_content(&self, segments: &[Value]) -> Result<String> {
        if segments.is_empty() {
            return Ok(serde_json::to_string(&json!({
                "status": "success",
                "message": "No content returned",
            }))?);
        }

        let joined = segments
            .iter()
            .map(segment_text)
            .collect::<Vec<_>>()
            .join("\n");

        match serde_json::from_str::<Value>(&joined) {
            Ok(parsed) => Ok(serde_json::to_string_pretty(&parsed)?),
            Err(_) => Ok(joined),
        }
    }
}

fn segment_text(segment: &Value) -> String {
    if let Some(text) = segment.get("text").and_then(Value::as_str) {
        return text.to_string();
    }
    match segment.get("data") {
        Some(Value::String(data)) => data.clone(),
        Some(data) => data.to_string(),
        None => segment.to_string(),
    }
}

fn failure(error: crate::error::Error) -> String {
    let message = match error {
        crate::error::Error::Tool(ToolError::NormalizationFailed { message }) => message,
        other => other.to_string(),
    };
    warn!("Failed to normalize tool result: {}", message);
    json!({"error": format!("Failed to extract result: {}", message)}).to_string()
}
