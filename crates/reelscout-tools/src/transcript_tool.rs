//! `sc_batch_transcripts` (spec §4.6 #3).

use crate::packet::validate_len;
use async_trait::async_trait;
use chrono::Utc;
use reelscout_config::TranscriptPolicy;
use reelscout_context::build_transcript_context;
use reelscout_core::error::Result;
use reelscout_core::model::Status;
use reelscout_core::tools::{Tool, ToolInput};
use reelscout_providers::TranscriptAdapter;
use reelscout_store::SessionLog;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

const MIN_URLS: usize = 1;
const MAX_URLS: usize = 60;

/// Hydrates transcripts, honoring the configured [`TranscriptPolicy`].
pub struct TranscriptTool {
    adapter: Arc<TranscriptAdapter>,
    session: Arc<Mutex<SessionLog>>,
    keyword: String,
    policy: TranscriptPolicy,
    max_transcript_chars: usize,
}

impl TranscriptTool {
    /// Construct a tool bound to the given adapter, shared session log, the
    /// session keyword, transcript policy, and the sample-truncation bound
    /// passed on to [`build_transcript_context`].
    pub fn new(
        adapter: Arc<TranscriptAdapter>,
        session: Arc<Mutex<SessionLog>>,
        keyword: impl Into<String>,
        policy: TranscriptPolicy,
        max_transcript_chars: usize,
    ) -> Self {
        Self {
            adapter,
            session,
            keyword: keyword.into(),
            policy,
            max_transcript_chars,
        }
    }
}

#[async_trait]
impl Tool for TranscriptTool {
    fn name(&self) -> &'static str {
        "sc_batch_transcripts"
    }

    fn description(&self) -> &'static str {
        "Fetch spoken-word transcripts for already-hydrated URLs, subject to the configured transcript policy."
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "urls": {
                    "type": "array",
                    "items": {"type": "string"},
                    "minItems": MIN_URLS,
                    "maxItems": MAX_URLS,
                }
            },
            "required": ["urls"],
            "additionalProperties": false,
        })
    }

    async fn call(&self, input: ToolInput) -> Result<String> {
        let urls = input.field_str_array("urls")?;
        if let Err(packet) = validate_len("urls", urls.len(), MIN_URLS, MAX_URLS) {
            return Ok(packet);
        }

        if self.policy == TranscriptPolicy::Never {
            let ctx = build_transcript_context(&[], &self.keyword, self.max_transcript_chars);
            return Ok(serde_json::to_string(&ctx).unwrap_or_default());
        }

        let eligible: Vec<String> = {
            let session = self.session.lock().await;
            urls.into_iter()
                .filter(|u| match session.get(u) {
                    Some(row) => match self.policy {
                        TranscriptPolicy::Always => true,
                        TranscriptPolicy::Smart => {
                            !reelscout_context::keyword::contains_keyword(&row.caption, &self.keyword)
                        }
                        TranscriptPolicy::Never => false,
                    },
                    None => false,
                })
                .collect()
        };
        if eligible.is_empty() {
            let ctx = build_transcript_context(&[], &self.keyword, self.max_transcript_chars);
            return Ok(serde_json::to_string(&ctx).unwrap_or_default());
        }

        reelscout_core::log_event::tool_request(self.name(), eligible.len());
        let results = self.adapter.batch_transcripts(&eligible).await?;

        let now = Utc::now();
        {
            let mut session = self.session.lock().await;
            for result in &results {
                let mut patch = crate::patch::status_patch(&result.url, &self.keyword, Status::Hydrated, now);
                patch.transcript = result.transcript.clone();
                session.upsert(patch, now);
            }
            session.flush()?;
        }

        let ctx = build_transcript_context(&results, &self.keyword, self.max_transcript_chars);
        reelscout_core::log_event::tool_response(self.name(), ctx.with_text, results.len() - ctx.with_text, &ctx.recommendation);
        Ok(serde_json::to_string(&ctx).unwrap_or_else(|_| json!({"error": "serialization_failed"}).to_string()))
    }
}
