//! Agent run results

use serde::{Deserialize, Serialize};
use serde_json::Value;

const OBSERVATION_LIMIT: usize = 1000;
const LOG_LIMIT: usize = 500;

/// Outcome of one agent request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRun {
    /// Final answer (usually YAML)
    pub output: String,

    /// Tools called along the way, in order
    pub tool_calls: Vec<ToolCallTrace>,
}

/// One tool call made while answering a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallTrace {
    /// 1-based position in the run
    pub step: usize,
    pub tool: String,
    pub tool_input: Value,
    /// Tool output, truncated
    pub observation: String,
    /// Model text that accompanied the call, truncated
    pub log: Option<String>,
}

impl ToolCallTrace {
    pub fn new(
        step: usize,
        tool: &str,
        tool_input: Value,
        observation: &str,
        log: Option<&str>,
    ) -> Self {
        let observation = match truncate_chars(observation, OBSERVATION_LIMIT) {
            Some(head) => format!("{}... (truncated)", head),
            None => observation.to_string(),
        };
        let log = log.filter(|l| !l.is_empty()).map(|l| {
            truncate_chars(l, LOG_LIMIT)
                .map(str::to_string)
                .unwrap_or_else(|| l.to_string())
        });
        Self {
            step,
            tool: tool.to_string(),
            tool_input,
            observation,
            log,
        }
    }
}

/// The first `limit` characters of `text`, or `None` when it already fits
fn truncate_chars(text: &str, limit: usize) -> Option<&str> {
    text.char_indices().nth(limit).map(|(end, _)| &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_short_observation_is_kept() {
        let trace = ToolCallTrace::new(1, "list_pipelines", json!({}), "[]", None);
        assert_eq!(trace.observation, "[]");
        assert!(trace.log.is_none());
    }

    #[test]
    fn test_long_observation_is_truncated() {
        let long = "é".repeat(1500);
        let log = "x".repeat(800);
        let trace = ToolCallTrace::new(2, "get_pipeline", json!({}), &long, Some(log.as_str()));
        assert!(trace.observation.ends_with("... (truncated)"));
        assert_eq!(trace.observation.chars().count(), 1000 + "... (truncated)".len());
        assert_eq!(trace.log.unwrap().len(), 500);
    }

    #[test]
    fn test_exact_limit_is_not_truncated() {
        let text = "a".repeat(1000);
        let trace = ToolCallTrace::new(1, "t", json!({}), &text, Some(""));
        assert_eq!(trace.observation, text);
        assert!(trace.log.is_none());
    }
}
