//! Error types and handling for pipegen core

use std::time::Duration;
use thiserror::Error;

/// Result type alias for pipegen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pipegen core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tool server connection errors
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Tool execution errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// LLM client errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Agent execution errors
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Template rendering errors
    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// Template registration errors
    #[error("Template error: {0}")]
    TemplateSyntax(#[from] handlebars::TemplateError),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },
}

/// Errors raised while talking to the tool server subprocess
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Failed to spawn tool server '{executable}': {message}")]
    ProcessSpawn { executable: String, message: String },

    #[error("Tool server initialization timed out after {}s. The server may not be responding correctly.", .timeout.as_secs_f64())]
    HandshakeTimeout { timeout: Duration },

    #[error("Tool server list_tools timed out after {}s. The server may not be responding correctly.", .timeout.as_secs_f64())]
    DiscoveryTimeout { timeout: Duration },

    #[error("Not connected to tool server")]
    NotConnected,

    #[error("Tool '{name}' not found. Available tools: {available:?}")]
    UnknownTool { name: String, available: Vec<String> },

    #[error("Tool server closed the connection")]
    ServerClosed,

    #[error("Protocol error: {message}")]
    Protocol { message: String },

    #[error("Tool server returned error {code}: {message}")]
    Rpc { code: i64, message: String },
}

/// Tool execution errors
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool not found: {name}")]
    NotFound { name: String },

    #[error("Tool execution failed: {name} - {message}")]
    ExecutionFailed { name: String, message: String },

    #[error("Invalid tool parameters: {message}")]
    InvalidParameters { message: String },

    #[error("Tool timeout: {name} after {}s", .timeout.as_secs_f64())]
    Timeout { name: String, timeout: Duration },

    #[error("Failed to extract result: {message}")]
    NormalizationFailed { message: String },
}

/// LLM client errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
}

/// Agent execution errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Maximum steps exceeded: {max_steps}")]
    MaxStepsExceeded { max_steps: usize },

    #[error("Agent not initialized. Call initialize() first.")]
    NotInitialized,
}

impl Error {
    /// Whether this error means the tool server can no longer be used
    pub fn is_fatal_connection_error(&self) -> bool {
        matches!(
            self,
            Error::Connection(ConnectionError::ServerClosed) | Error::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tool_message_lists_known_names() {
        let err = ConnectionError::UnknownTool {
            name: "delete_everything".to_string(),
            available: vec!["list_pipelines".to_string(), "create_pipeline".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("delete_everything"));
        assert!(message.contains("list_pipelines"));
        assert!(message.contains("create_pipeline"));
    }

    #[test]
    fn timeouts_report_their_bound() {
        let err = ConnectionError::HandshakeTimeout {
            timeout: Duration::from_secs(30),
        };
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn only_transport_failures_are_fatal() {
        assert!(Error::from(ConnectionError::ServerClosed).is_fatal_connection_error());
        assert!(!Error::from(ConnectionError::Rpc {
            code: -32000,
            message: "boom".to_string()
        })
        .is_fatal_connection_error());
    }
}
