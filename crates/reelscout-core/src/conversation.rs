//! The explicit, driver-owned conversation item list (spec §4.7, §9).
//!
//! The agent loop represents conversation state as an ordered
//! `Vec<ConversationItem>` rather than an opaque "previous response id"
//! pointer, so every `ToolCall` the assistant emits is always re-sent to it
//! alongside the matching `ToolCallOutput` on the next turn.

use serde::{Deserialize, Serialize};

/// One item in the ordered conversation the driver owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationItem {
    /// A message from the user (the system prompt also travels as this kind
    /// with `role: "system"` folded in by the LLM transport, not here).
    UserText {
        /// Message text.
        text: String,
    },
    /// Free text emitted by the assistant.
    AssistantText {
        /// Message text.
        text: String,
    },
    /// A tool invocation the assistant requested.
    ToolCall {
        /// Tool name (must match a name in §4.6's contract).
        name: String,
        /// Correlates this call with its eventual output.
        call_id: String,
        /// Raw JSON arguments as sent by the model.
        arguments: serde_json::Value,
    },
    /// The result of executing a `ToolCall`. Always paired 1:1 by `call_id`.
    ToolCallOutput {
        /// The `call_id` of the `ToolCall` this output answers.
        call_id: String,
        /// JSON-encoded tool result (an intelligence packet or error packet).
        output: String,
    },
}

impl ConversationItem {
    /// Construct a `UserText` item.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::UserText { text: text.into() }
    }

    /// Construct an `AssistantText` item.
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::AssistantText { text: text.into() }
    }

    /// Construct a `ToolCallOutput` item.
    pub fn tool_call_output(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self::ToolCallOutput {
            call_id: call_id.into(),
            output: output.into(),
        }
    }

    /// `call_id` if this item is a `ToolCall` or `ToolCallOutput`, else `None`.
    #[must_use]
    pub fn call_id(&self) -> Option<&str> {
        match self {
            Self::ToolCall { call_id, .. } | Self::ToolCallOutput { call_id, .. } => {
                Some(call_id.as_str())
            }
            Self::UserText { .. } | Self::AssistantText { .. } => None,
        }
    }
}

/// Verifies the threading contract from spec §8: every `ToolCall` in
/// `items` has exactly one matching `ToolCallOutput` with the same
/// `call_id`, and vice versa.
#[must_use]
pub fn tool_calls_fully_paired(items: &[ConversationItem]) -> bool {
    use std::collections::HashSet;

    let mut calls = HashSet::new();
    let mut outputs = HashSet::new();
    for item in items {
        match item {
            ConversationItem::ToolCall { call_id, .. } => {
                if !calls.insert(call_id.clone()) {
                    return false; // duplicate call_id
                }
            }
            ConversationItem::ToolCallOutput { call_id, .. } => {
                if !outputs.insert(call_id.clone()) {
                    return false; // duplicate output for same call_id
                }
            }
            ConversationItem::UserText { .. } | ConversationItem::AssistantText { .. } => {}
        }
    }
    calls == outputs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairing_detects_missing_output() {
        let items = vec![ConversationItem::ToolCall {
            name: "finalize".to_string(),
            call_id: "c1".to_string(),
            arguments: serde_json::json!({}),
        }];
        assert!(!tool_calls_fully_paired(&items));
    }

    #[test]
    fn pairing_accepts_matched_pair() {
        let items = vec![
            ConversationItem::ToolCall {
                name: "finalize".to_string(),
                call_id: "c1".to_string(),
                arguments: serde_json::json!({}),
            },
            ConversationItem::tool_call_output("c1", "{}"),
        ];
        assert!(tool_calls_fully_paired(&items));
    }
}
