//! The agent loop (spec §4.7): an [`LlmClient`] seam, a production
//! [`OpenAiClient`], the system prompt contract, and the turn-by-turn
//! driver that threads an explicit conversation through the tool router
//! until `finalize` runs, `MAX_ITERATIONS` is hit, or an unrecoverable
//! error packet ends the run early.

pub mod llm_client;
pub mod loop_;
pub mod openai_client;
pub mod prompt;

pub use llm_client::{LlmClient, LlmTurn, ToolCallRequest, ToolDefinition};
pub use loop_::{run, AgentLoopConfig, AgentOutcome, StopReason};
pub use openai_client::OpenAiClient;
pub use prompt::build_system_prompt;
