//! The [`LlmClient`] seam (spec §4.7): one call per turn, taking the full
//! conversation and tool catalog and returning assistant text and/or a batch
//! of tool calls. Kept as a trait so tests can swap in a scripted client
//! instead of talking to a real endpoint.

use async_trait::async_trait;
use reelscout_core::conversation::ConversationItem;
use reelscout_core::error::Result;
use serde_json::Value;

/// One tool call the model asked for: a name, an opaque id used to pair it
/// with its eventual [`ConversationItem::ToolCallOutput`], and its
/// arguments.
#[derive(Debug, Clone)]
pub struct ToolCallRequest {
    pub name: String,
    pub call_id: String,
    pub arguments: Value,
}

/// One LLM turn: optional prose plus zero or more tool calls. A turn with
/// neither is the model declining to act further without calling
/// `finalize`, which the loop treats as a stall and ends the run on.
#[derive(Debug, Clone, Default)]
pub struct LlmTurn {
    pub assistant_text: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

/// A tool definition as advertised to the model: `(name, description,
/// strict JSON Schema for its arguments)`.
pub type ToolDefinition = (&'static str, &'static str, Value);

/// Sends the system prompt plus the full conversation so far, along with
/// the tool catalog, and returns the model's next turn.
///
/// Implementations own their own retry policy for transport-level failures
/// (spec §7: `llm_error` is retried once); what they must never do is
/// silently drop a turn — a hard failure after retries is an `Err`, not an
/// empty [`LlmTurn`].
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn next_turn(
        &self,
        system_prompt: &str,
        items: &[ConversationItem],
        tools: &[ToolDefinition],
    ) -> Result<LlmTurn>;
}
