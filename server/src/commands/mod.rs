//! CLI command implementations

pub mod serve;
pub mod tools;

pub use serve::serve_command;
pub use tools::tools_command;
