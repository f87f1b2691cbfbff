//! MCP (Model Context Protocol) tool server bridge
//!
//! Owns one subprocess-backed tool server reachable over newline-delimited
//! JSON-RPC on stdio: spawn, handshake, catalog discovery, tool calls and
//! teardown.

pub mod catalog;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod session;

pub use catalog::ToolCatalog;
pub use connection::{ConnectOptions, ConnectionState, ToolServerConnection};
pub use protocol::ToolDescriptor;
pub use server::ToolServer;
pub use session::McpSession;
