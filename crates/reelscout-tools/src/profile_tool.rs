//! `sc_batch_profiles` (spec §4.6 #4).

use crate::packet::validate_len;
use async_trait::async_trait;
use chrono::Utc;
use reelscout_context::build_profile_context;
use reelscout_context::profile_context::{classify, ConfidenceTier};
use reelscout_core::error::Result;
use reelscout_core::model::{Reel, Status, UsDecision};
use reelscout_core::tools::{Tool, ToolInput};
use reelscout_providers::ProfileAdapter;
use reelscout_store::SessionLog;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

const MIN_HANDLES: usize = 1;
const MAX_HANDLES: usize = 40;

/// Hydrates owner profiles and folds a condensed US verdict back onto
/// matching rows. Profiles themselves are never persisted to the reel log.
pub struct ProfileTool {
    adapter: Arc<ProfileAdapter>,
    session: Arc<Mutex<SessionLog>>,
    keyword: String,
}

impl ProfileTool {
    /// Construct a tool bound to the given adapter, shared session log, and
    /// the session's top-level keyword.
    pub fn new(adapter: Arc<ProfileAdapter>, session: Arc<Mutex<SessionLog>>, keyword: impl Into<String>) -> Self {
        Self {
            adapter,
            session,
            keyword: keyword.into(),
        }
    }
}

#[async_trait]
impl Tool for ProfileTool {
    fn name(&self) -> &'static str {
        "sc_batch_profiles"
    }

    fn description(&self) -> &'static str {
        "Hydrate owner profiles and fold a condensed US-likelihood verdict back onto their reels."
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "handles": {
                    "type": "array",
                    "items": {"type": "string"},
                    "minItems": MIN_HANDLES,
                    "maxItems": MAX_HANDLES,
                }
            },
            "required": ["handles"],
            "additionalProperties": false,
        })
    }

    async fn call(&self, input: ToolInput) -> Result<String> {
        let handles = input.field_str_array("handles")?;
        if let Err(packet) = validate_len("handles", handles.len(), MIN_HANDLES, MAX_HANDLES) {
            return Ok(packet);
        }

        reelscout_core::log_event::tool_request(self.name(), handles.len());
        let profiles = self.adapter.batch_profiles(&handles).await?;
        let ctx = build_profile_context(&profiles);

        let reasons: HashMap<&str, (UsDecision, String)> = profiles
            .iter()
            .filter_map(|p| match classify(p) {
                (ConfidenceTier::High | ConfidenceTier::Medium, summary) => {
                    Some((p.handle.as_str(), (UsDecision::Us, summary)))
                }
                (ConfidenceTier::Low, _) => None,
            })
            .collect();

        let now = Utc::now();
        {
            let mut session = self.session.lock().await;
            let rows = session.rows();
            for row in rows {
                let Some(handle) = row.owner_handle.as_deref() else { continue };
                if let Some((decision, reason)) = reasons.get(handle) {
                    let mut patch = Reel::discovered(&row.url, &self.keyword, now);
                    patch.status = Status::Hydrated;
                    patch.us_decision = *decision;
                    patch.us_reason = reason.clone();
                    session.upsert(patch, now);
                }
            }
            session.flush()?;
        }

        reelscout_core::log_event::tool_response(self.name(), profiles.len(), handles.len() - profiles.len(), &ctx.recommendation);
        Ok(serde_json::to_string(&ctx).unwrap_or_else(|_| json!({"error": "serialization_failed"}).to_string()))
    }
}
