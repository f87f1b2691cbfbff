//! Agent configuration structures

use serde::{Deserialize, Serialize};

/// Default bound on reasoning steps per request
pub const DEFAULT_MAX_STEPS: usize = 15;

/// Configuration for an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum number of LLM round trips per request
    pub max_steps: usize,

    /// Custom system prompt; the built-in prompt is used when absent
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            system_prompt: None,
        }
    }
}

impl AgentConfig {
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.system_prompt = system_prompt;
        self
    }
}
