//! Test doubles for the agent loop's [`LlmClient`] seam, in the same
//! configurable-handler-plus-call-history shape this workspace's other
//! mock collaborators use.

pub mod mock_llm_client;

pub use mock_llm_client::{MockLlmClient, MockLlmClientBuilder};
