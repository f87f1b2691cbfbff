//! OpenAI-compatible client implementation using async-openai

use crate::config::ResolvedLlmConfig;
use crate::error::{LlmError, Result};
use crate::llm::{
    ChatOptions, ContentBlock, FinishReason, LlmClient, LlmMessage, LlmResponse, MessageContent,
    MessageRole, ToolDefinition, Usage,
};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessage,
        ChatCompletionRequestAssistantMessageContent, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestToolMessage,
        ChatCompletionRequestToolMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse, FunctionCall, FunctionObject,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value;

/// Default OpenAI API base
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat completions client for OpenAI and compatible endpoints
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiClient {
    /// Create a new client from resolved LLM config
    pub fn new(config: &ResolvedLlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::Authentication {
                message: "No API key found for OpenAI".to_string(),
            }
            .into());
        }

        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);
        if !config.base_url.is_empty() && config.base_url != DEFAULT_BASE_URL {
            openai_config = openai_config.with_api_base(config.base_url.trim_end_matches('/'));
        }

        Ok(Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
        })
    }

    /// Convert our message model to request messages
    fn convert_messages(
        &self,
        messages: Vec<LlmMessage>,
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut converted = Vec::with_capacity(messages.len());

        for message in messages {
            match message.role {
                MessageRole::System => {
                    converted.push(ChatCompletionRequestMessage::System(
                        ChatCompletionRequestSystemMessage {
                            content: text_of(&message.content).into(),
                            name: None,
                        },
                    ));
                }
                MessageRole::User => {
                    converted.push(ChatCompletionRequestMessage::User(
                        ChatCompletionRequestUserMessage {
                            content: text_of(&message.content).into(),
                            name: None,
                        },
                    ));
                }
                MessageRole::Assistant => {
                    converted.push(ChatCompletionRequestMessage::Assistant(
                        assistant_message(&message.content),
                    ));
                }
                MessageRole::Tool => {
                    let results: Vec<_> = match &message.content {
                        MessageContent::Blocks(blocks) => blocks
                            .iter()
                            .filter_map(|block| match block {
                                ContentBlock::ToolResult {
                                    tool_use_id,
                                    content,
                                } => Some(ChatCompletionRequestMessage::Tool(
                                    ChatCompletionRequestToolMessage {
                                        content: ChatCompletionRequestToolMessageContent::Text(
                                            content.clone(),
                                        ),
                                        tool_call_id: tool_use_id.clone(),
                                    },
                                )),
                                _ => None,
                            })
                            .collect(),
                        MessageContent::Text(_) => Vec::new(),
                    };
                    if results.is_empty() {
                        return Err(LlmError::InvalidRequest {
                            message: "Tool message must contain a tool result".to_string(),
                        }
                        .into());
                    }
                    converted.extend(results);
                }
            }
        }

        Ok(converted)
    }

    fn convert_tools(&self, tools: Vec<ToolDefinition>) -> Vec<ChatCompletionTool> {
        tools
            .into_iter()
            .map(|tool| ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name: tool.function.name,
                    description: Some(tool.function.description),
                    parameters: Some(tool.function.parameters),
                    strict: None,
                },
            })
            .collect()
    }

    fn convert_response(&self, response: CreateChatCompletionResponse) -> Result<LlmResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidRequest {
                message: "No choices in response".to_string(),
            })?;

        let mut blocks = Vec::new();
        if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
            blocks.push(ContentBlock::Text { text });
        }
        for tool_call in choice.message.tool_calls.unwrap_or_default() {
            let arguments = tool_call.function.arguments;
            let input = serde_json::from_str::<Value>(&arguments)
                .unwrap_or(Value::String(arguments));
            blocks.push(ContentBlock::ToolUse {
                id: tool_call.id,
                name: tool_call.function.name,
                input,
            });
        }

        let content = match blocks.as_slice() {
            [] => MessageContent::Text(String::new()),
            [ContentBlock::Text { text }] => MessageContent::Text(text.clone()),
            _ => MessageContent::Blocks(blocks),
        };

        let finish_reason = choice.finish_reason.map(|reason| match reason {
            async_openai::types::FinishReason::Stop => FinishReason::Stop,
            async_openai::types::FinishReason::Length => FinishReason::Length,
            async_openai::types::FinishReason::ToolCalls => FinishReason::ToolCalls,
            async_openai::types::FinishReason::ContentFilter => FinishReason::ContentFilter,
            async_openai::types::FinishReason::FunctionCall => FinishReason::ToolCalls,
        });

        Ok(LlmResponse {
            message: LlmMessage {
                role: MessageRole::Assistant,
                content,
            },
            usage: response.usage.map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            model: response.model,
            finish_reason,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat_completion(
        &self,
        messages: Vec<LlmMessage>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> Result<LlmResponse> {
        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model);
        request_builder.messages(self.convert_messages(messages)?);

        if let Some(tools) = tools.filter(|t| !t.is_empty()) {
            tracing::debug!("Chat request with {} tools enabled", tools.len());
            request_builder.tools(self.convert_tools(tools));
        }

        let options = options.unwrap_or_default();
        if let Some(max_tokens) = options.max_tokens {
            request_builder.max_tokens(max_tokens);
        }
        if let Some(temperature) = options.temperature {
            request_builder.temperature(temperature);
        }
        if let Some(top_p) = options.top_p {
            request_builder.top_p(top_p);
        }

        let request = request_builder
            .build()
            .map_err(|e| LlmError::InvalidRequest {
                message: format!("Failed to build request: {}", e),
            })?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            tracing::error!("Chat completion failed: {}", e);
            LlmError::ApiError {
                // async-openai does not expose the HTTP status
                status: 500,
                message: e.to_string(),
            }
        })?;

        let response = self.convert_response(response)?;
        for block in response.message.get_tool_uses() {
            if let ContentBlock::ToolUse { id, name, .. } = block {
                tracing::debug!("Model requested tool {} (id: {})", name, id);
            }
        }
        Ok(response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

fn text_of(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Blocks(blocks) => blocks
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn assistant_message(content: &MessageContent) -> ChatCompletionRequestAssistantMessage {
    let text = text_of(content);
    let tool_calls: Vec<ChatCompletionMessageToolCall> = match content {
        MessageContent::Text(_) => Vec::new(),
        MessageContent::Blocks(blocks) => blocks
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => Some(ChatCompletionMessageToolCall {
                    id: id.clone(),
                    r#type: ChatCompletionToolType::Function,
                    function: FunctionCall {
                        name: name.clone(),
                        arguments: match input {
                            Value::String(raw) => raw.clone(),
                            other => other.to_string(),
                        },
                    },
                }),
                _ => None,
            })
            .collect(),
    };

    ChatCompletionRequestAssistantMessage {
        content: (!text.is_empty())
            .then(|| ChatCompletionRequestAssistantMessageContent::Text(text)),
        tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
        ..Default::default()
    }
}
