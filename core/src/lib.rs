//! # pipegen core
//!
//! Building blocks for the pipegen service: a bridge to an MCP tool server
//! running as a subprocess, adapters exposing its tools to an LLM, and the
//! function-calling agent that drafts CI/CD pipeline and connector YAML.

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod mcp;
pub mod tools;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::{AgentConfig, AgentRun, PipelineAgent, RequestKind, ToolCallTrace};
pub use config::{ModelParams, ResolvedLlmConfig, ServerEndpoint};
pub use error::{Error, Result};
pub use mcp::{ConnectOptions, ConnectionState, ToolServer, ToolServerConnection};
pub use tools::{ResultNormalizer, ToolAdapter, ToolInfo, ToolRegistry};

/// Current version of the pipegen-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

