//! `finalize` (spec §4.6 #5): the LLM's terminal commitment of candidates.
//! Validates presence/hydration, marks rows `analyzed`, and runs the
//! post-processing pipeline (spec §4.8) to decide `accepted`/`rejected`.

use async_trait::async_trait;
use chrono::Utc;
use reelscout_core::error::Result;
use reelscout_core::model::Status;
use reelscout_core::tools::{Tool, ToolInput};
use reelscout_postprocess::{run as run_postprocess, PostProcessConfig};
use reelscout_store::SessionLog;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Runs US filtering, per-creator capping, shuffling, and slicing over the
/// LLM's finalized candidate set, persisting the outcome to the session log.
pub struct FinalizeTool {
    session: Arc<Mutex<SessionLog>>,
    keyword: String,
    config: PostProcessConfig,
}

impl FinalizeTool {
    /// Construct a tool bound to the shared session log, the session
    /// keyword, and the post-processing tunables for this run.
    pub fn new(session: Arc<Mutex<SessionLog>>, keyword: impl Into<String>, config: PostProcessConfig) -> Self {
        Self {
            session,
            keyword: keyword.into(),
            config,
        }
    }
}

#[async_trait]
impl Tool for FinalizeTool {
    fn name(&self) -> &'static str {
        "finalize"
    }

    fn description(&self) -> &'static str {
        "Commit the final set of candidate Reel URLs. Ends the search loop and triggers post-processing."
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "urls": {
                    "type": "array",
                    "items": {"type": "string"},
                    "minItems": 1,
                }
            },
            "required": ["urls"],
            "additionalProperties": false,
        })
    }

    async fn call(&self, input: ToolInput) -> Result<String> {
        let urls = input.field_str_array("urls")?;
        if urls.is_empty() {
            return Ok(json!({"error": "invalid_arguments", "message": "'urls' must be non-empty"}).to_string());
        }

        let now = Utc::now();
        let mut candidates = Vec::new();
        let mut skipped = Vec::new();
        {
            let mut session = self.session.lock().await;
            for url in &urls {
                match session.get(url) {
                    Some(row) if row.status != Status::Discovered => {
                        let mut analyzed = row.clone();
                        analyzed.status = Status::Analyzed;
                        analyzed.row_updated_at = now;
                        session.upsert(analyzed.clone(), now);
                        candidates.push(analyzed);
                    }
                    _ => skipped.push(url.clone()),
                }
            }
            session.flush()?;
        }

        let outcome = run_postprocess(candidates, &self.config);

        {
            let mut session = self.session.lock().await;
            for url in &outcome.accepted {
                session.upsert(
                    crate::patch::status_patch(url, &self.keyword, Status::Accepted, now),
                    now,
                );
            }
            for url in &outcome.rejected {
                session.upsert(
                    crate::patch::status_patch(url, &self.keyword, Status::Rejected, now),
                    now,
                );
            }
            session.flush()?;
        }

        reelscout_core::log_event::final_summary(outcome.accepted.len(), outcome.rejected.len(), 0);
        Ok(json!({
            "accepted": outcome.accepted,
            "rejected_count": outcome.rejected.len(),
            "skipped_not_hydrated": skipped,
        })
        .to_string())
    }
}
