//! Tool registry exposing discovered and local tools to the agent

use crate::error::{Error, ToolError};
use crate::llm::ToolDefinition;
use crate::mcp::ToolServer;
use crate::tools::adapter::{failure_text, parse_arguments, ToolAdapter, DEFAULT_CALL_TIMEOUT};
use crate::tools::builtin::McpTool;
use crate::tools::{Tool, ToolCall, ToolInfo};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Factory trait for creating local tools
pub trait ToolFactory: Send + Sync {
    /// Create a new instance of the tool
    fn create(&self) -> Box<dyn Tool>;

    /// Get the name of the tool this factory creates
    fn tool_name(&self) -> &str;

    /// Get the description of the tool this factory creates
    fn tool_description(&self) -> &str;
}

/// Ordered set of tool adapters: discovered tools first, then local ones
pub struct ToolRegistry {
    adapters: Vec<ToolAdapter>,
    index: HashMap<String, usize>,
    call_timeout: Option<Duration>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new(call_timeout: Option<Duration>) -> Self {
        Self {
            adapters: Vec::new(),
            index: HashMap::new(),
            call_timeout,
        }
    }

    /// Build the full registry for a connected tool server
    pub fn for_server(server: Arc<dyn ToolServer>, call_timeout: Option<Duration>) -> Self {
        let mut registry = Self::new(call_timeout);
        registry.register_server_tools(server);
        for factory in local_factories() {
            registry.register_factory(factory.as_ref());
        }
        registry
    }

    /// Wrap every discovered tool, in catalog order
    pub fn register_server_tools(&mut self, server: Arc<dyn ToolServer>) {
        for name in server.list_tools() {
            match server.get_schema(&name) {
                Some(descriptor) => {
                    self.register_tool(Box::new(McpTool::new(server.clone(), descriptor)))
                }
                None => warn!("Tool '{}' disappeared from the catalog", name),
            }
        }
    }

    /// Register a local tool through its factory
    pub fn register_factory(&mut self, factory: &dyn ToolFactory) {
        debug!("Registering local tool {}", factory.tool_name());
        self.register_tool(factory.create());
    }

    /// Register a tool; the first tool with a given name wins
    pub fn register_tool(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            warn!("Tool '{}' is already registered; ignoring duplicate", name);
            return;
        }
        let adapter = ToolAdapter::new(Arc::from(tool)).with_call_timeout(self.call_timeout);
        self.index.insert(name, self.adapters.len());
        self.adapters.push(adapter);
    }

    pub fn get(&self, name: &str) -> Option<&ToolAdapter> {
        self.index.get(name).map(|&i| &self.adapters[i])
    }

    /// Names and descriptions, in registration order
    pub fn list_adapters(&self) -> Vec<ToolInfo> {
        self.adapters.iter().map(ToolAdapter::info).collect()
    }

    /// Function-calling definitions handed to the LLM
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.adapters
            .iter()
            .map(|adapter| {
                ToolDefinition::function(
                    adapter.name(),
                    adapter.description(),
                    adapter.parameters_schema(),
                )
            })
            .collect()
    }

    /// Invoke a tool by name on raw argument text
    pub async fn invoke(&self, name: &str, arguments_text: &str) -> String {
        self.invoke_call(ToolCall::new(name, parse_arguments(name, arguments_text)))
            .await
    }

    /// Invoke the tool named by `call`
    pub async fn invoke_call(&self, call: ToolCall) -> String {
        match self.get(&call.name) {
            Some(adapter) => adapter.invoke_call(call).await,
            None => {
                warn!("Agent requested unknown tool '{}'", call.name);
                failure_text(
                    &call.name,
                    &Error::from(ToolError::NotFound {
                        name: call.name.clone(),
                    }),
                )
            }
        }
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(Some(DEFAULT_CALL_TIMEOUT))
    }
}

/// Tools implemented in-process
pub fn local_factories() -> Vec<Box<dyn ToolFactory>> {
    vec![Box::new(crate::tools::builtin::GenerateYamlToolFactory)]
}

/// Macro to help implement tool factories
#[macro_export]
macro_rules! impl_tool_factory {
    ($factory:ident, $tool:ident, $name:expr, $description:expr) => {
        pub struct $factory;

        impl $crate::tools::ToolFactory for $factory {
            fn create(&self) -> Box<dyn $crate::tools::Tool> {
                Box::new($tool::new())
            }

            fn tool_name(&self) -> &str {
                $name
            }

            fn tool_description(&self) -> &str {
                $description
            }
        }
    };
}
