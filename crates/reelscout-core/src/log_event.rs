//! Structured log events (spec §4.2).
//!
//! Every event is emitted and flushed immediately through `tracing` so a run
//! can be diagnosed from a tail of `logs/{run_id}.log`. No secrets are ever
//! passed as fields here — callers must redact credentials before calling in.

/// Emit an `iteration_start` event.
pub fn iteration_start(iteration: u32, max_iterations: u32) {
    tracing::info!(event = "iteration_start", iteration, max_iterations);
}

/// Emit a `tool_request` event.
pub fn tool_request(tool: &str, item_count: usize) {
    tracing::info!(event = "tool_request", tool, item_count);
}

/// Emit a `tool_response` event.
pub fn tool_response(tool: &str, success_count: usize, failure_count: usize, recommendation: &str) {
    tracing::info!(
        event = "tool_response",
        tool,
        success_count,
        failure_count,
        recommendation
    );
}

/// Emit an `intelligence` event summarizing a packet built for the LLM.
pub fn intelligence(tool: &str, item_count: usize, recommendation: &str) {
    tracing::info!(event = "intelligence", tool, item_count, recommendation);
}

/// Emit a `warn` event.
pub fn warn(tool: Option<&str>, message: &str) {
    tracing::warn!(event = "warn", tool = tool.unwrap_or("-"), message);
}

/// Emit an `error` event.
pub fn error(tool: Option<&str>, message: &str) {
    tracing::error!(event = "error", tool = tool.unwrap_or("-"), message);
}

/// Emit the terminal `final` event summarizing a completed run.
pub fn final_summary(accepted: usize, rejected: usize, iterations: u32) {
    tracing::info!(event = "final", accepted, rejected, iterations);
}
