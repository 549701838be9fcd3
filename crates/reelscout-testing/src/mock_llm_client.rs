//! A scripted [`LlmClient`] for driving the agent loop deterministically in
//! tests: a queue of canned turns, an optional dynamic handler, call
//! history, and a one-shot `fail_next`.

use async_trait::async_trait;
use reelscout_agent::llm_client::{LlmClient, LlmTurn, ToolDefinition};
use reelscout_core::conversation::ConversationItem;
use reelscout_core::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Handler function type for dynamic scripted turns.
pub type MockLlmHandler = Arc<dyn Fn(&[ConversationItem]) -> Result<LlmTurn> + Send + Sync>;

/// A configurable mock [`LlmClient`] for testing the agent loop.
///
/// # Example
///
/// ```rust,ignore
/// use reelscout_testing::MockLlmClient;
///
/// let client = MockLlmClient::new().with_scripted_turns(vec![turn_one, turn_two]);
/// ```
#[derive(Clone)]
pub struct MockLlmClient {
    scripted_turns: Arc<Mutex<VecDeque<LlmTurn>>>,
    handler: Option<MockLlmHandler>,
    call_history: Arc<Mutex<Vec<Vec<ConversationItem>>>>,
    call_count: Arc<Mutex<usize>>,
    should_fail: Arc<Mutex<bool>>,
    error_message: String,
}

impl std::fmt::Debug for MockLlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLlmClient")
            .field("call_count", &self.call_count())
            .field("turns_remaining", &self.scripted_turns.lock().unwrap().len())
            .finish()
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmClient {
    /// Create an empty mock client: no scripted turns, no handler. Calling
    /// `next_turn` before configuring one panics through `expect`, which is
    /// intentional — an un-scripted mock call is a test bug.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scripted_turns: Arc::new(Mutex::new(VecDeque::new())),
            handler: None,
            call_history: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            should_fail: Arc::new(Mutex::new(false)),
            error_message: "mock LLM transport failure".to_string(),
        }
    }

    /// Queue a fixed sequence of turns, returned one per call to
    /// `next_turn`, in order.
    #[must_use]
    pub fn with_scripted_turns(mut self, turns: Vec<LlmTurn>) -> Self {
        self.scripted_turns = Arc::new(Mutex::new(turns.into_iter().collect()));
        self
    }

    /// Install a dynamic handler, consulted when the scripted queue is
    /// empty (or always, if no turns were scripted).
    #[must_use]
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&[ConversationItem]) -> Result<LlmTurn> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Set the message used the next time [`Self::fail_next`] triggers a
    /// failure.
    #[must_use]
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    /// Make the next `next_turn` call return `Err` instead of consuming a
    /// scripted turn or the handler.
    pub fn fail_next(&self) {
        *self.should_fail.lock().unwrap() = true;
    }

    /// Number of times `next_turn` has been called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// The conversation snapshot passed on each call, in order.
    #[must_use]
    pub fn call_history(&self) -> Vec<Vec<ConversationItem>> {
        self.call_history.lock().unwrap().clone()
    }

    /// Whether any call's conversation contained a `ToolCallOutput` whose
    /// `output` contains `needle`.
    #[must_use]
    pub fn was_called_with_output_containing(&self, needle: &str) -> bool {
        self.call_history.lock().unwrap().iter().any(|items| {
            items.iter().any(|item| match item {
                ConversationItem::ToolCallOutput { output, .. } => output.contains(needle),
                _ => false,
            })
        })
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn next_turn(
        &self,
        _system_prompt: &str,
        items: &[ConversationItem],
        _tools: &[ToolDefinition],
    ) -> Result<LlmTurn> {
        *self.call_count.lock().unwrap() += 1;
        self.call_history.lock().unwrap().push(items.to_vec());

        {
            let mut should_fail = self.should_fail.lock().unwrap();
            if *should_fail {
                *should_fail = false;
                return Err(Error::llm_error(self.error_message.clone()));
            }
        }

        if let Some(turn) = self.scripted_turns.lock().unwrap().pop_front() {
            return Ok(turn);
        }
        if let Some(handler) = &self.handler {
            return handler(items);
        }
        Err(Error::llm_error(
            "MockLlmClient called with no scripted turns and no handler installed",
        ))
    }
}

/// A builder for [`MockLlmClient`], mirroring the shape of this
/// workspace's other mock-collaborator builders.
pub struct MockLlmClientBuilder {
    client: MockLlmClient,
}

impl MockLlmClientBuilder {
    /// Start a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: MockLlmClient::new(),
        }
    }

    /// Queue scripted turns.
    #[must_use]
    pub fn turns(mut self, turns: Vec<LlmTurn>) -> Self {
        self.client = self.client.with_scripted_turns(turns);
        self
    }

    /// Install a dynamic handler.
    #[must_use]
    pub fn handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&[ConversationItem]) -> Result<LlmTurn> + Send + Sync + 'static,
    {
        self.client = self.client.with_handler(f);
        self
    }

    /// Build the client.
    #[must_use]
    pub fn build(self) -> MockLlmClient {
        self.client
    }
}

impl Default for MockLlmClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelscout_agent::llm_client::ToolCallRequest;
    use serde_json::json;

    fn finalize_turn() -> LlmTurn {
        LlmTurn {
            assistant_text: None,
            tool_calls: vec![ToolCallRequest {
                name: "finalize".to_string(),
                call_id: "call_1".to_string(),
                arguments: json!({"urls": []}),
            }],
        }
    }

    #[tokio::test]
    async fn scripted_turns_are_returned_in_order() {
        let client = MockLlmClient::new().with_scripted_turns(vec![
            LlmTurn {
                assistant_text: Some("thinking".to_string()),
                tool_calls: vec![],
            },
            finalize_turn(),
        ]);

        let first = client.next_turn("sys", &[], &[]).await.unwrap();
        assert_eq!(first.assistant_text.as_deref(), Some("thinking"));

        let second = client.next_turn("sys", &[], &[]).await.unwrap();
        assert_eq!(second.tool_calls[0].name, "finalize");

        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn fail_next_fails_exactly_once() {
        let client = MockLlmClient::new().with_scripted_turns(vec![finalize_turn(), finalize_turn()]);
        client.fail_next();

        let first = client.next_turn("sys", &[], &[]).await;
        assert!(first.is_err());

        let second = client.next_turn("sys", &[], &[]).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn handler_runs_once_scripted_queue_is_drained() {
        let client = MockLlmClient::new()
            .with_scripted_turns(vec![LlmTurn::default()])
            .with_handler(|_items| Ok(finalize_turn()));

        let first = client.next_turn("sys", &[], &[]).await.unwrap();
        assert!(first.tool_calls.is_empty());

        let second = client.next_turn("sys", &[], &[]).await.unwrap();
        assert_eq!(second.tool_calls[0].name, "finalize");
    }

    #[tokio::test]
    async fn call_history_records_the_conversation_seen_each_call() {
        let client = MockLlmClient::new().with_scripted_turns(vec![finalize_turn()]);
        let items = vec![ConversationItem::user_text("find reels")];

        client.next_turn("sys", &items, &[]).await.unwrap();

        let history = client.call_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].len(), 1);
    }
}
