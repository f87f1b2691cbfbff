//! In-memory tool server used by unit tests

use crate::error::{Result, ToolError};
use crate::mcp::{ToolCatalog, ToolDescriptor, ToolServer};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeToolServer {
    descriptors: Vec<ToolDescriptor>,
    responses: HashMap<String, Value>,
    failures: HashMap<String, String>,
    calls: Mutex<Vec<(String, Value)>>,
    closed: AtomicBool,
}

impl FakeToolServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(mut self, name: &str, description: &str) -> Self {
        self.descriptors.push(ToolDescriptor {
            name: name.to_string(),
            description: description.to_string(),
            input_schema: json!({"type": "object", "properties": {}}),
        });
        self
    }

    pub fn with_response(mut self, name: &str, result: Value) -> Self {
        self.responses.insert(name.to_string(), result);
        self
    }

    pub fn with_failure(mut self, name: &str, message: &str) -> Self {
        self.failures.insert(name.to_string(), message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    fn catalog(&self) -> ToolCatalog {
        ToolCatalog::from_descriptors(self.descriptors.clone())
    }
}

#[async_trait]
impl ToolServer for FakeToolServer {
    fn list_tools(&self) -> Vec<String> {
        self.catalog().names()
    }

    fn get_schema(&self, name: &str) -> Option<ToolDescriptor> {
        self.catalog().get(name).cloned()
    }

    fn is_ready(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<Option<Value>> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), arguments));
        if let Some(message) = self.failures.get(name) {
            return Err(ToolError::ExecutionFailed {
                name: name.to_string(),
                message: message.clone(),
            }
            .into());
        }
        Ok(self.responses.get(name).cloned())
    }

    async fn disconnect(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
