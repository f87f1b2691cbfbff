//! PipelineAgent implementation

use super::config::AgentConfig;
use super::execution::{AgentRun, ToolCallTrace};
use super::prompt::{PromptTemplates, RequestKind, SYSTEM_PROMPT};
use crate::config::ResolvedLlmConfig;
use crate::error::{AgentError, Result};
use crate::llm::{ChatOptions, ContentBlock, LlmClient, LlmMessage, OpenAiClient};
use crate::tools::{arguments_from_value, ToolCall, ToolRegistry};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Drives the LLM through tool calls until it produces a final answer
pub struct PipelineAgent {
    config: AgentConfig,
    llm_client: Arc<dyn LlmClient>,
    registry: Arc<ToolRegistry>,
    templates: PromptTemplates,
    chat_options: ChatOptions,
}

impl PipelineAgent {
    pub fn new(
        config: AgentConfig,
        llm_client: Arc<dyn LlmClient>,
        registry: Arc<ToolRegistry>,
    ) -> Result<Self> {
        Ok(Self {
            config,
            llm_client,
            registry,
            templates: PromptTemplates::new()?,
            chat_options: ChatOptions::default(),
        })
    }

    /// Build an agent backed by an OpenAI-compatible endpoint
    pub fn with_llm_config(
        config: AgentConfig,
        llm_config: &ResolvedLlmConfig,
        registry: Arc<ToolRegistry>,
    ) -> Result<Self> {
        let client = Arc::new(OpenAiClient::new(llm_config)?);
        let agent = Self::new(config, client, registry)?;
        Ok(agent.with_chat_options(ChatOptions::from(&llm_config.params)))
    }

    pub fn with_chat_options(mut self, chat_options: ChatOptions) -> Self {
        self.chat_options = chat_options;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn model_name(&self) -> &str {
        self.llm_client.model_name()
    }

    pub async fn generate_pipeline(&self, request: &str) -> Result<AgentRun> {
        self.run(RequestKind::Pipeline, request).await
    }

    pub async fn generate_connector(&self, request: &str) -> Result<AgentRun> {
        self.run(RequestKind::Connector, request).await
    }

    pub async fn process_request(&self, request: &str) -> Result<AgentRun> {
        self.run(RequestKind::General, request).await
    }

    /// Answer one request. Each request starts from a fresh conversation.
    pub async fn run(&self, kind: RequestKind, request: &str) -> Result<AgentRun> {
        let started = Instant::now();
        info!("Agent handling {:?} request", kind);

        let mut messages = vec![
            LlmMessage::system(self.system_prompt()),
            LlmMessage::user(self.templates.render(kind, request)?),
        ];
        let tool_definitions = self.registry.tool_definitions();
        let mut tool_calls: Vec<ToolCallTrace> = Vec::new();

        for step in 1..=self.config.max_steps {
            debug!("Agent step {}", step);
            let response = self
                .llm_client
                .chat_completion(
                    messages.clone(),
                    Some(tool_definitions.clone()),
                    Some(self.chat_options.clone()),
                )
                .await
                .map_err(|e| {
                    error!("LLM request failed at step {}: {}", step, e);
                    e
                })?;

            let message = response.message;
            if !message.has_tool_use() {
                info!(
                    "Agent finished after {} steps and {} tool calls in {:.2}s",
                    step,
                    tool_calls.len(),
                    started.elapsed().as_secs_f64()
                );
                return Ok(AgentRun {
                    output: message.get_text().unwrap_or_default(),
                    tool_calls,
                });
            }

            let log = message.get_text();
            let uses: Vec<(String, String, serde_json::Value)> = message
                .get_tool_uses()
                .into_iter()
                .filter_map(|block| match block {
                    ContentBlock::ToolUse { id, name, input } => {
                        Some((id.clone(), name.clone(), input.clone()))
                    }
                    _ => None,
                })
                .collect();
            messages.push(message);

            for (id, name, input) in uses {
                let arguments = arguments_from_value(&name, &input);
                let call = ToolCall::new(name.as_str(), arguments.clone()).with_id(id.as_str());
                let observation = self.registry.invoke_call(call).await;

                tool_calls.push(ToolCallTrace::new(
                    tool_calls.len() + 1,
                    &name,
                    arguments,
                    &observation,
                    log.as_deref(),
                ));
                messages.push(LlmMessage::tool_result(id, observation));
            }
        }

        error!("Agent gave up after {} steps", self.config.max_steps);
        Err(AgentError::MaxStepsExceeded {
            max_steps: self.config.max_steps,
        }
        .into())
    }

    fn system_prompt(&self) -> String {
        let base = self.config.system_prompt.as_deref().unwrap_or(SYSTEM_PROMPT);
        let names: Vec<String> = self
            .registry
            .list_adapters()
            .into_iter()
            .map(|info| info.name)
            .collect();
        if names.is_empty() {
            base.to_string()
        } else {
            format!("{}\n\nAvailable tools: {}", base, names.join(", "))
        }
    }
}
