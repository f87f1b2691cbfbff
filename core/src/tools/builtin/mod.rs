//! Built-in tools

pub mod mcp;
pub mod yaml;

pub use mcp::McpTool;
pub use yaml::{GenerateYamlTool, GenerateYamlToolFactory};
