//! Local YAML rendering tool

use crate::error::Result;
use crate::impl_tool_factory;
use crate::tools::{Tool, ToolCall, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Renders a JSON document as block-style YAML, keeping key order
pub struct GenerateYamlTool;

impl GenerateYamlTool {
    pub fn new() -> Self {
        Self
    }

    fn render(&self, parameters: &Value) -> std::result::Result<String, String> {
        // A lone `data` or `input` key wraps the document; anything else is the document
        let payload = match parameters.as_object() {
            Some(object) if object.len() == 1 => object
                .get("data")
                .or_else(|| object.get("input"))
                .unwrap_or(parameters),
            _ => parameters,
        };

        let document = match payload {
            Value::String(text) => {
                serde_json::from_str::<Value>(text).map_err(|e| e.to_string())?
            }
            other => other.clone(),
        };

        serde_yaml::to_string(&document).map_err(|e| e.to_string())
    }
}

impl Default for GenerateYamlTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for GenerateYamlTool {
    fn name(&self) -> &str {
        "generate_yaml"
    }

    fn description(&self) -> &str {
        "Generate YAML from a JSON object. Pass the pipeline or connector \
         definition as 'data' (an object or a JSON string); returns YAML text."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "data": {
                    "description": "The document to render, as a JSON object or a JSON string"
                }
            },
            "required": ["data"]
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        match self.render(&call.parameters) {
            Ok(yaml) => Ok(ToolResult::success(call.id, yaml)),
            Err(message) => {
                tracing::warn!("generate_yaml failed: {}", message);
                Ok(ToolResult::error(
                    call.id,
                    format!("Error generating YAML: {}", message),
                ))
            }
        }
    }
}

impl_tool_factory!(
    GenerateYamlToolFactory,
    GenerateYamlTool,
    "generate_yaml",
    "Generate YAML from a JSON object"
);
