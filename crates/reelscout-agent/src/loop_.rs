//! The agent loop proper (spec §4.7): single-threaded cooperative
//! scheduling over an explicit, driver-owned conversation. Each turn asks
//! the model for its next move, fans the requested tool calls out under a
//! shared semaphore, and folds every result back into the conversation as a
//! paired [`ConversationItem::ToolCallOutput`] before asking again.

use crate::llm_client::LlmClient;
use reelscout_core::conversation::ConversationItem;
use reelscout_core::error::{Error, ErrorKind, Result};
use reelscout_core::tools::ToolInput;
use reelscout_providers::http::backoff_delay;
use reelscout_tools::ToolRouter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;

/// Upper bound on how long a single turn (one LLM round-trip plus its tool
/// fan-out) is expected to take, used to derive the loop's overall deadline
/// (spec §5: `MAX_ITERATIONS × max-expected-turn-latency`).
const EXPECTED_TURN_LATENCY: Duration = Duration::from_secs(60);

/// Knobs the loop needs beyond the tool catalog and LLM client themselves.
#[derive(Debug, Clone, Copy)]
pub struct AgentLoopConfig {
    pub max_iterations: u32,
    pub parallel: usize,
    pub retry: u32,
}

/// Why the loop stopped, for the CLI's exit-code decision (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The model called `finalize` and it ran to completion.
    Finalized,
    /// `MAX_ITERATIONS` was reached without a `finalize` call.
    IterationLimit,
    /// The wall-clock deadline passed without a `finalize` call.
    Deadline,
    /// The model produced neither text nor a tool call, twice in a row.
    Stalled,
}

/// Outcome of one complete run of the loop.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub iterations: u32,
    pub stop_reason: StopReason,
}

/// Drive the loop to completion or to an unrecoverable stop.
///
/// Returns `Err` only for unrecoverable conditions (spec §7):
/// `out_of_credits` or `auth_failed` surfacing from a tool call, or the LLM
/// transport failing after its own retry. Everything else — transient
/// provider hiccups, a stalled model, hitting `MAX_ITERATIONS` — is folded
/// into a normal [`AgentOutcome`] so the CLI can still merge whatever rows
/// were persisted before stopping.
pub async fn run(
    llm: Arc<dyn LlmClient>,
    router: Arc<ToolRouter>,
    system_prompt: String,
    opening_message: String,
    config: AgentLoopConfig,
) -> Result<AgentOutcome> {
    let mut items = vec![ConversationItem::user_text(opening_message)];
    let tool_defs = router.definitions();
    let deadline = Instant::now() + EXPECTED_TURN_LATENCY * config.max_iterations.max(1);

    let mut iteration = 0;
    let mut empty_turns = 0;
    let stop_reason = loop {
        if iteration >= config.max_iterations {
            break StopReason::IterationLimit;
        }
        if Instant::now() >= deadline {
            reelscout_core::log_event::warn(None, "agent loop deadline reached before finalize");
            break StopReason::Deadline;
        }

        iteration += 1;
        reelscout_core::log_event::iteration_start(iteration, config.max_iterations);

        let turn = llm.next_turn(&system_prompt, &items, &tool_defs).await?;

        if let Some(text) = &turn.assistant_text {
            if !text.is_empty() {
                items.push(ConversationItem::assistant_text(text.clone()));
            }
        }

        if turn.tool_calls.is_empty() {
            empty_turns += 1;
            if empty_turns >= 2 {
                break StopReason::Stalled;
            }
            continue;
        }
        empty_turns = 0;

        for call in &turn.tool_calls {
            items.push(ConversationItem::ToolCall {
                name: call.name.clone(),
                call_id: call.call_id.clone(),
                arguments: call.arguments.clone(),
            });
        }

        let semaphore = Arc::new(Semaphore::new(config.parallel.max(1)));
        let mut handles = Vec::with_capacity(turn.tool_calls.len());
        for call in turn.tool_calls.clone() {
            let router = Arc::clone(&router);
            let semaphore = Arc::clone(&semaphore);
            let retry = config.retry;
            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore is never closed");
                let output = dispatch_with_retry(&router, &call.name, call.arguments.clone(), retry).await;
                (call.call_id, call.name, output)
            }));
        }

        let mut finalized = false;
        let mut unrecoverable = None;
        for handle in handles {
            let (call_id, name, output) = handle
                .await
                .map_err(|e| Error::tool_error(format!("tool task panicked: {e}")))?;
            if let Some(kind) = unrecoverable_kind(&output) {
                unrecoverable = Some((name.clone(), kind));
            }
            if name == "finalize" && !output.contains("\"error\"") {
                finalized = true;
            }
            items.push(ConversationItem::tool_call_output(call_id, output));
        }

        if let Some((name, kind)) = unrecoverable {
            let message = format!("{name} returned an unrecoverable error: {kind}");
            return Err(Error::new(kind, message));
        }
        if finalized {
            break StopReason::Finalized;
        }
    };

    Ok(AgentOutcome {
        iterations: iteration,
        stop_reason,
    })
}

/// Re-dispatch a tool call while its error packet names a retryable kind,
/// backing off between attempts (spec §4.7's per-tool-call retry policy).
/// [`ToolRouter::dispatch`] never returns `Err`, so retryability has to be
/// read back out of the packet's `error` field rather than branched on a
/// live `Result`.
async fn dispatch_with_retry(router: &ToolRouter, name: &str, arguments: serde_json::Value, retry: u32) -> String {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let output = router.dispatch(name, ToolInput::Structured(arguments.clone())).await;
        let Some(kind) = retryable_kind(&output) else {
            return output;
        };
        if attempt > retry {
            return output;
        }
        backoff_delay(kind, attempt).await;
    }
}

fn retryable_kind(packet: &str) -> Option<ErrorKind> {
    let parsed: serde_json::Value = serde_json::from_str(packet).ok()?;
    match parsed.get("error")?.as_str()? {
        "transient" => Some(ErrorKind::Transient),
        "rate_limited" => Some(ErrorKind::RateLimited),
        _ => None,
    }
}

fn unrecoverable_kind(packet: &str) -> Option<ErrorKind> {
    let parsed: serde_json::Value = serde_json::from_str(packet).ok()?;
    match parsed.get("error")?.as_str()? {
        "out_of_credits" => Some(ErrorKind::OutOfCredits),
        "auth_failed" => Some(ErrorKind::AuthFailed),
        _ => None,
    }
}
