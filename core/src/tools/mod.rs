//! Tool system: adapters, normalization and built-in tools

pub mod adapter;
pub mod base;
pub mod builtin;
pub mod normalize;
pub mod registry;

pub use adapter::{arguments_from_value, parse_arguments, ToolAdapter, DEFAULT_CALL_TIMEOUT};
pub use base::{Tool, ToolCall, ToolInfo, ToolResult};
pub use normalize::ResultNormalizer;
pub use registry::{ToolFactory, ToolRegistry};
