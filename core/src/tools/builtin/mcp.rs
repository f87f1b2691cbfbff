//! Tools discovered on the tool server

use crate::error::Result;
use crate::mcp::{ToolDescriptor, ToolServer};
use crate::tools::normalize::ResultNormalizer;
use crate::tools::{Tool, ToolCall, ToolResult};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// One discovered server tool, bound to its name at construction
pub struct McpTool {
    name: String,
    description: String,
    input_schema: Value,
    server: Arc<dyn ToolServer>,
    normalizer: ResultNormalizer,
}

impl McpTool {
    pub fn new(server: Arc<dyn ToolServer>, descriptor: ToolDescriptor) -> Self {
        let description = if descriptor.description.trim().is_empty() {
            format!("Tool: {}", descriptor.name)
        } else {
            descriptor.description
        };
        Self {
            name: descriptor.name,
            description,
            input_schema: descriptor.input_schema,
            server,
            normalizer: ResultNormalizer::new(),
        }
    }
}

#[async_trait]
impl Tool for McpTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        self.input_schema.clone()
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let started = std::time::Instant::now();
        let raw = self.server.call_tool(&self.name, call.parameters).await?;
        let text = self.normalizer.normalize(raw.as_ref());
        let flagged = raw
            .as_ref()
            .and_then(|value| value.get("isError"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let result = if flagged {
            ToolResult::error(call.id, text)
        } else {
            ToolResult::success(call.id, text)
        };
        Ok(result.with_duration(started.elapsed().as_millis() as u64))
    }
}
