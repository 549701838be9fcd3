//! Exercises the loop driver's termination conditions against a scripted
//! [`MockLlmClient`] and a minimal tool registry, without touching real
//! providers or the filesystem.

use async_trait::async_trait;
use reelscout_agent::llm_client::ToolCallRequest;
use reelscout_agent::{run, AgentLoopConfig, LlmTurn, StopReason};
use reelscout_core::error::Result;
use reelscout_core::tools::{Tool, ToolInput};
use reelscout_testing::MockLlmClient;
use reelscout_tools::ToolRouter;
use serde_json::json;
use std::sync::Arc;

struct StubFinalize;

#[async_trait]
impl Tool for StubFinalize {
    fn name(&self) -> &'static str {
        "finalize"
    }
    fn description(&self) -> &'static str {
        "stub finalize"
    }
    fn args_schema(&self) -> serde_json::Value {
        json!({"type": "object"})
    }
    async fn call(&self, _input: ToolInput) -> Result<String> {
        Ok(json!({"accepted": ["https://www.instagram.com/reel/abc123"], "rejected_count": 0}).to_string())
    }
}

struct StubSearch;

#[async_trait]
impl Tool for StubSearch {
    fn name(&self) -> &'static str {
        "serper_search_reels_batch"
    }
    fn description(&self) -> &'static str {
        "stub search"
    }
    fn args_schema(&self) -> serde_json::Value {
        json!({"type": "object"})
    }
    async fn call(&self, _input: ToolInput) -> Result<String> {
        Ok(json!({"found": 1}).to_string())
    }
}

struct StubOutOfCredits;

#[async_trait]
impl Tool for StubOutOfCredits {
    fn name(&self) -> &'static str {
        "sc_batch_posts"
    }
    fn description(&self) -> &'static str {
        "stub post hydration that always runs out of credits"
    }
    fn args_schema(&self) -> serde_json::Value {
        json!({"type": "object"})
    }
    async fn call(&self, _input: ToolInput) -> Result<String> {
        Err(reelscout_core::error::Error::out_of_credits("provider balance exhausted"))
    }
}

fn router_with_finalize() -> Arc<ToolRouter> {
    Arc::new(ToolRouter::new(vec![Box::new(StubFinalize), Box::new(StubSearch)]))
}

#[tokio::test]
async fn stops_with_finalized_when_the_model_calls_finalize() {
    let llm = Arc::new(
        MockLlmClient::new().with_scripted_turns(vec![LlmTurn {
            assistant_text: None,
            tool_calls: vec![ToolCallRequest {
                name: "finalize".to_string(),
                call_id: "call_1".to_string(),
                arguments: json!({"urls": []}),
            }],
        }]),
    );

    let outcome = run(
        llm,
        router_with_finalize(),
        "system prompt".to_string(),
        "find reels".to_string(),
        AgentLoopConfig {
            max_iterations: 5,
            parallel: 4,
            retry: 1,
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.stop_reason, StopReason::Finalized);
    assert_eq!(outcome.iterations, 1);
}

#[tokio::test]
async fn stops_at_iteration_limit_when_the_model_never_finalizes() {
    let search_call = LlmTurn {
        assistant_text: None,
        tool_calls: vec![ToolCallRequest {
            name: "serper_search_reels_batch".to_string(),
            call_id: "call_1".to_string(),
            arguments: json!({"queries": ["a"]}),
        }],
    };
    let llm = Arc::new(MockLlmClient::new().with_handler(move |_items| Ok(search_call.clone())));

    let outcome = run(
        llm,
        router_with_finalize(),
        "system prompt".to_string(),
        "find reels".to_string(),
        AgentLoopConfig {
            max_iterations: 3,
            parallel: 4,
            retry: 1,
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.stop_reason, StopReason::IterationLimit);
    assert_eq!(outcome.iterations, 3);
}

#[tokio::test]
async fn stalls_after_two_consecutive_empty_turns() {
    let llm = Arc::new(MockLlmClient::new().with_handler(|_items| Ok(LlmTurn::default())));

    let outcome = run(
        llm,
        router_with_finalize(),
        "system prompt".to_string(),
        "find reels".to_string(),
        AgentLoopConfig {
            max_iterations: 10,
            parallel: 4,
            retry: 1,
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.stop_reason, StopReason::Stalled);
    assert_eq!(outcome.iterations, 2);
}

#[tokio::test]
async fn an_out_of_credits_tool_packet_ends_the_run_as_an_error() {
    let router = Arc::new(ToolRouter::new(vec![Box::new(StubOutOfCredits), Box::new(StubFinalize)]));
    let llm = Arc::new(
        MockLlmClient::new().with_scripted_turns(vec![LlmTurn {
            assistant_text: None,
            tool_calls: vec![ToolCallRequest {
                name: "sc_batch_posts".to_string(),
                call_id: "call_1".to_string(),
                arguments: json!({"urls": []}),
            }],
        }]),
    );

    let err = run(
        llm,
        router,
        "system prompt".to_string(),
        "find reels".to_string(),
        AgentLoopConfig {
            max_iterations: 5,
            parallel: 4,
            retry: 1,
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), reelscout_core::ErrorKind::OutOfCredits);
}
