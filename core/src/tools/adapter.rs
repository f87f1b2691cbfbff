//! Per-tool wrapper exposing the agent-facing string contract

use crate::error::{Error, ToolError};
use crate::tools::{Tool, ToolCall, ToolInfo};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Default bound on a single tool invocation
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Wraps a [`Tool`] so the reasoning loop sees `text in → text out`.
///
/// `invoke` never fails: argument parse problems are tolerated and every
/// error is folded into a `{"error", "tool", "status": "failed"}` object.
#[derive(Clone)]
pub struct ToolAdapter {
    tool: Arc<dyn Tool>,
    call_timeout: Option<Duration>,
}

impl ToolAdapter {
    pub fn new(tool: Arc<dyn Tool>) -> Self {
        Self {
            tool,
            call_timeout: Some(DEFAULT_CALL_TIMEOUT),
        }
    }

    /// `None` disables the bound
    pub fn with_call_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn name(&self) -> &str {
        self.tool.name()
    }

    pub fn description(&self) -> &str {
        self.tool.description()
    }

    pub fn parameters_schema(&self) -> Value {
        self.tool.parameters_schema()
    }

    pub fn info(&self) -> ToolInfo {
        ToolInfo {
            name: self.name().to_string(),
            description: self.description().to_string(),
        }
    }

    /// Run the tool on raw argument text
    pub async fn invoke(&self, arguments_text: &str) -> String {
        let call = ToolCall::new(self.name(), parse_arguments(self.name(), arguments_text));
        self.invoke_call(call).await
    }

    /// Run the tool on an already-built call
    pub async fn invoke_call(&self, call: ToolCall) -> String {
        let name = self.name().to_string();
        info!("Calling tool {} with {}", name, call.parameters);

        let started = Instant::now();
        let outcome = match self.call_timeout {
            Some(bound) => tokio::time::timeout(bound, self.tool.execute(call))
                .await
                .unwrap_or_else(|_| {
                    Err(ToolError::Timeout {
                        name: name.clone(),
                        timeout: bound,
                    }
                    .into())
                }),
            None => self.tool.execute(call).await,
        };
        let elapsed = started.elapsed().as_secs_f64();

        match outcome {
            Ok(result) => {
                if result.success {
                    info!("Tool {} completed in {:.2}s", name, elapsed);
                } else {
                    warn!("Tool {} reported a failure after {:.2}s", name, elapsed);
                }
                result.content
            }
            Err(e) => {
                error!("Tool {} failed after {:.2}s: {}", name, elapsed, e);
                failure_text(&name, &e)
            }
        }
    }
}

impl std::fmt::Debug for ToolAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolAdapter")
            .field("name", &self.name())
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

/// Interpret the agent's argument text as an arguments object
pub fn parse_arguments(tool: &str, arguments_text: &str) -> Value {
    let trimmed = arguments_text.trim();
    if trimmed.is_empty() {
        return Value::Object(Map::new());
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(arguments)) => Value::Object(arguments),
        Ok(other) => json!({"input": other}),
        Err(e) => {
            warn!(
                "Arguments for {} are not valid JSON ({}); passing them as input",
                tool, e
            );
            json!({"input": arguments_text})
        }
    }
}

/// Arguments object from a model-supplied tool input value
pub fn arguments_from_value(tool: &str, input: &Value) -> Value {
    match input {
        Value::String(raw) => parse_arguments(tool, raw),
        Value::Object(_) => input.clone(),
        other => json!({"input": other}),
    }
}

/// Failure object returned to the agent in place of a result
pub fn failure_text(tool: &str, error: &Error) -> String {
    json!({
        "error": error.to_string(),
        "tool": tool,
        "status": "failed",
    })
    .to_string()
}
