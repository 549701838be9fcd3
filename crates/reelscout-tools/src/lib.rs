//! The five session tools (spec §4.6) and a [`ToolRouter`] that dispatches
//! an LLM tool call by name, turning unknown names and tool-level errors
//! alike into machine-readable packets instead of propagating `Err` up to
//! the agent loop.

pub mod finalize_tool;
pub mod packet;
pub mod patch;
pub mod post_tool;
pub mod profile_tool;
pub mod search_tool;
pub mod transcript_tool;

pub use finalize_tool::FinalizeTool;
pub use post_tool::PostTool;
pub use profile_tool::ProfileTool;
pub use search_tool::SearchTool;
pub use transcript_tool::TranscriptTool;

use packet::error_packet;
use reelscout_core::tools::{Tool, ToolInput};
use std::collections::HashMap;

/// Dispatches tool calls by name to a fixed registry of [`Tool`] impls.
pub struct ToolRouter {
    tools: HashMap<&'static str, Box<dyn Tool>>,
}

impl ToolRouter {
    /// Build a router from a set of tools, keyed by [`Tool::name`]. Later
    /// entries win on a name collision.
    #[must_use]
    pub fn new(tools: Vec<Box<dyn Tool>>) -> Self {
        let tools = tools.into_iter().map(|t| (t.name(), t)).collect();
        Self { tools }
    }

    /// Tool definitions for the LLM's tool-calling contract: `(name,
    /// description, args_schema)` triples, in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<(&'static str, &'static str, serde_json::Value)> {
        self.tools
            .values()
            .map(|t| (t.name(), t.description(), t.args_schema()))
            .collect()
    }

    /// Dispatch one call by name. Never returns `Err`: an unknown tool name
    /// or a tool-level error both come back as an error packet string, so
    /// the agent loop can always fold the result straight into a
    /// `ToolCallOutput` (spec §4.6/§7).
    pub async fn dispatch(&self, name: &str, input: ToolInput) -> String {
        let Some(tool) = self.tools.get(name) else {
            reelscout_core::log_event::warn(Some(name), "unknown tool name requested by the model");
            return error_packet("unknown_tool", &format!("no tool named '{name}' is registered"));
        };

        match tool.call(input).await {
            Ok(output) => output,
            Err(e) => {
                reelscout_core::log_event::error(Some(name), &e.to_string());
                error_packet(&e.kind().to_string(), e.message())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reelscout_core::error::{Error, Result};
    use serde_json::{json, Value};

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }
        fn description(&self) -> &'static str {
            "echoes its input"
        }
        fn args_schema(&self) -> Value {
            json!({"type": "object"})
        }
        async fn call(&self, _input: ToolInput) -> Result<String> {
            Ok(json!({"ok": true}).to_string())
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn description(&self) -> &'static str {
            "always fails"
        }
        fn args_schema(&self) -> Value {
            json!({"type": "object"})
        }
        async fn call(&self, _input: ToolInput) -> Result<String> {
            Err(Error::tool_error("boom"))
        }
    }

    #[tokio::test]
    async fn dispatches_to_the_matching_tool() {
        let router = ToolRouter::new(vec![Box::new(EchoTool)]);
        let out = router.dispatch("echo", ToolInput::Structured(json!({}))).await;
        assert_eq!(out, json!({"ok": true}).to_string());
    }

    #[tokio::test]
    async fn unknown_tool_name_returns_an_error_packet_not_a_panic() {
        let router = ToolRouter::new(vec![Box::new(EchoTool)]);
        let out = router.dispatch("does_not_exist", ToolInput::Structured(json!({}))).await;
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["error"], "unknown_tool");
    }

    #[tokio::test]
    async fn tool_errors_are_folded_into_a_packet_rather_than_propagated() {
        let router = ToolRouter::new(vec![Box::new(FailingTool)]);
        let out = router.dispatch("failing", ToolInput::Structured(json!({}))).await;
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["error"], "tool_error");
    }
}
