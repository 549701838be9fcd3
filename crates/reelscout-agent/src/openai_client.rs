//! The production [`LlmClient`]: OpenAI's chat-completions tool-calling API
//! via `async-openai`, grounded in the request/response shapes the
//! Cargo workspace's own chat-model wrapper builds against.

use crate::llm_client::{LlmClient, LlmTurn, ToolCallRequest, ToolDefinition};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolChoiceOption, ChatCompletionToolType,
    CreateChatCompletionRequestArgs, FunctionCall, FunctionObject,
};
use async_openai::Client;
use async_trait::async_trait;
use reelscout_core::conversation::ConversationItem;
use reelscout_core::error::{Error, Result};
use reelscout_core::ErrorKind;
use reelscout_providers::http::backoff_delay;

/// An LLM transport backed by an OpenAI-compatible chat-completions
/// endpoint. Retries once on a transport failure before giving up (spec
/// §7: `llm_error` is retried once).
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiClient {
    /// Construct a client for the given model, authenticated with `api_key`.
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.into());
        Self {
            client: Client::with_config(config),
            model: model.into(),
        }
    }
}

/// Build the chat-completion tool catalog from the router's definitions.
fn to_chat_tools(tools: &[ToolDefinition]) -> Vec<ChatCompletionTool> {
    tools
        .iter()
        .map(|(name, description, schema)| ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: (*name).to_string(),
                description: Some((*description).to_string()),
                parameters: Some(schema.clone()),
                strict: Some(true),
            },
        })
        .collect()
}

/// Translate the driver-owned conversation into chat-completion messages.
///
/// Consecutive [`ConversationItem::ToolCall`]s (the model's own turn) fold
/// into one assistant message carrying multiple `tool_calls`, matching how
/// the API expects them to be grouped; each following
/// [`ConversationItem::ToolCallOutput`] becomes its own tool message.
fn to_messages(system_prompt: &str, items: &[ConversationItem]) -> Result<Vec<ChatCompletionRequestMessage>> {
    let mut messages = Vec::with_capacity(items.len() + 1);
    messages.push(
        ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(|e| Error::llm_error(format!("failed to build system message: {e}")))?
            .into(),
    );

    let mut pending_calls: Vec<ChatCompletionMessageToolCall> = Vec::new();
    let flush = |pending: &mut Vec<ChatCompletionMessageToolCall>, out: &mut Vec<ChatCompletionRequestMessage>| -> Result<()> {
        if pending.is_empty() {
            return Ok(());
        }
        let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
        builder.tool_calls(std::mem::take(pending));
        let message = builder
            .build()
            .map_err(|e| Error::llm_error(format!("failed to build assistant tool-call message: {e}")))?;
        out.push(message.into());
        Ok(())
    };

    for item in items {
        match item {
            ConversationItem::UserText { text } => {
                flush(&mut pending_calls, &mut messages)?;
                let message = ChatCompletionRequestUserMessageArgs::default()
                    .content(text.as_str())
                    .build()
                    .map_err(|e| Error::llm_error(format!("failed to build user message: {e}")))?;
                messages.push(message.into());
            }
            ConversationItem::AssistantText { text } => {
                flush(&mut pending_calls, &mut messages)?;
                let message = ChatCompletionRequestAssistantMessageArgs::default()
                    .content(text.as_str())
                    .build()
                    .map_err(|e| Error::llm_error(format!("failed to build assistant message: {e}")))?;
                messages.push(message.into());
            }
            ConversationItem::ToolCall {
                name,
                call_id,
                arguments,
            } => {
                pending_calls.push(ChatCompletionMessageToolCall {
                    id: call_id.clone(),
                    r#type: ChatCompletionToolType::Function,
                    function: FunctionCall {
                        name: name.clone(),
                        arguments: arguments.to_string(),
                    },
                });
            }
            ConversationItem::ToolCallOutput { call_id, output } => {
                flush(&mut pending_calls, &mut messages)?;
                let message = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(call_id.as_str())
                    .content(output.as_str())
                    .build()
                    .map_err(|e| Error::llm_error(format!("failed to build tool message: {e}")))?;
                messages.push(message.into());
            }
        }
    }
    flush(&mut pending_calls, &mut messages)?;

    Ok(messages)
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn next_turn(
        &self,
        system_prompt: &str,
        items: &[ConversationItem],
        tools: &[ToolDefinition],
    ) -> Result<LlmTurn> {
        let messages = to_messages(system_prompt, items)?;
        let chat_tools = to_chat_tools(tools);

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .tools(chat_tools)
            .tool_choice(ChatCompletionToolChoiceOption::Auto)
            .build()
            .map_err(|e| Error::llm_error(format!("failed to build chat completion request: {e}")))?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.chat().create(request.clone()).await {
                Ok(response) => {
                    let Some(choice) = response.choices.into_iter().next() else {
                        return Err(Error::llm_error("model returned no choices"));
                    };
                    let tool_calls = choice
                        .message
                        .tool_calls
                        .unwrap_or_default()
                        .into_iter()
                        .map(|call| {
                            let arguments = serde_json::from_str(&call.function.arguments)
                                .unwrap_or_else(|_| serde_json::json!({}));
                            ToolCallRequest {
                                name: call.function.name,
                                call_id: call.id,
                                arguments,
                            }
                        })
                        .collect();
                    return Ok(LlmTurn {
                        assistant_text: choice.message.content,
                        tool_calls,
                    });
                }
                Err(e) if attempt <= 1 => {
                    tracing::warn!(event = "llm_transport_retry", attempt, error = %e);
                    backoff_delay(ErrorKind::LlmError, attempt).await;
                }
                Err(e) => return Err(Error::llm_error(format!("LLM request failed: {e}"))),
            }
        }
    }
}
