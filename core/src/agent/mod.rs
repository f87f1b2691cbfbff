//! Function-calling agent that drafts pipeline and connector YAML

pub mod config;
pub mod core;
pub mod execution;
pub mod prompt;

pub use config::AgentConfig;
pub use core::PipelineAgent;
pub use execution::{AgentRun, ToolCallTrace};
pub use prompt::{PromptTemplates, RequestKind, SYSTEM_PROMPT};
