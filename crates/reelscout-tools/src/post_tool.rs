//! `sc_batch_posts` (spec §4.6 #2).

use crate::packet::validate_len;
use async_trait::async_trait;
use chrono::Utc;
use reelscout_context::build_post_context;
use reelscout_core::error::Result;
use reelscout_core::model::{Reel, Status};
use reelscout_core::tools::{Tool, ToolInput};
use reelscout_providers::{PostAdapter, PostBrief};
use reelscout_store::SessionLog;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

const MIN_URLS: usize = 1;
const MAX_URLS: usize = 60;

/// Hydrates post metadata for already-discovered URLs.
pub struct PostTool {
    adapter: Arc<PostAdapter>,
    session: Arc<Mutex<SessionLog>>,
    keyword: String,
}

impl PostTool {
    /// Construct a tool bound to the given adapter, shared session log, and
    /// the session's top-level keyword.
    pub fn new(adapter: Arc<PostAdapter>, session: Arc<Mutex<SessionLog>>, keyword: impl Into<String>) -> Self {
        Self {
            adapter,
            session,
            keyword: keyword.into(),
        }
    }
}

fn apply_brief(patch_base: &mut Reel, brief: &PostBrief) {
    patch_base.caption = brief.caption.clone().unwrap_or_default();
    patch_base.owner_handle = brief.owner_handle.clone();
    patch_base.owner_name = brief.owner_name.clone();
    patch_base.is_verified = brief.is_verified;
    patch_base.is_video = brief.is_video;
    patch_base.product_type = brief.product_type.clone();
    patch_base.views = brief.views;
    patch_base.taken_at_iso = brief.taken_at_iso.clone();
    patch_base.thumbnail = brief.thumbnail.clone();
    patch_base.location_name = brief.location_name.clone();
}

#[async_trait]
impl Tool for PostTool {
    fn name(&self) -> &'static str {
        "sc_batch_posts"
    }

    fn description(&self) -> &'static str {
        "Hydrate post metadata (caption, owner, views, location) for URLs already discovered in this session."
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

        let present: Vec<String> = {
            let session = self.session.lock().await;
            urls.into_iter().filter(|u| session.get(u).is_some()).collect()
        };
        if present.is_empty() {
            return Ok(json!({"error": "no_known_urls", "message": "none of the given urls are present in the session"}).to_string());
        }

        reelscout_core::log_event::tool_request(self.name(), present.len());
        let briefs = self.adapter.batch_posts(&present).await?;

        let now = Utc::now();
        {
            let mut session = self.session.lock().await;
            for brief in &briefs {
                let mut patch = crate::patch::status_patch(&brief.url, &self.keyword, Status::Hydrated, now);
                apply_brief(&mut patch, brief);
                session.upsert(patch, now);
            }
            session.flush()?;
        }

        let ctx = build_post_context(&briefs, &self.keyword);
        reelscout_core::log_event::tool_response(self.name(), briefs.len(), present.len() - briefs.len(), &ctx.recommendation);
        Ok(serde_json::to_string(&ctx).unwrap_or_else(|_| json!({"error": "serialization_failed"}).to_string()))
    }
}
