use super::protocol::ToolDescriptor;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Capability boundary between tool adapters and a tool server.
///
/// [`super::ToolServerConnection`] is the production implementation.
#[async_trait]
pub trait ToolServer: Send + Sync {
    /// Discovered tool names in discovery order
    fn list_tools(&self) -> Vec<String>;

    fn get_schema(&self, name: &str) -> Option<ToolDescriptor>;

    fn is_ready(&self) -> bool;

    /// Invoke a tool and return its raw result (`None` for a null result)
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<Option<Value>>;

    async fn disconnect(&self);
}
