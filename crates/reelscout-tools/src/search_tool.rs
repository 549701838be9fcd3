//! `serper_search_reels_batch` (spec §4.6 #1).

use crate::packet::validate_len;
use async_trait::async_trait;
use chrono::Utc;
use reelscout_core::error::Result;
use reelscout_core::model::{Reel, Status};
use reelscout_core::tools::{Tool, ToolInput};
use reelscout_providers::SearchAdapter;
use reelscout_store::SessionLog;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

const MIN_QUERIES: usize = 1;
const MAX_QUERIES: usize = 12;
const SAMPLE_URLS: usize = 5;

/// Dispatches search queries and seeds the session log with discovered URLs.
pub struct SearchTool {
    adapter: Arc<SearchAdapter>,
    session: Arc<Mutex<SessionLog>>,
    keyword: String,
}

impl SearchTool {
    /// Construct a tool bound to the given adapter, shared session log, and
    /// the session's top-level keyword (used to label freshly discovered
    /// rows regardless of which sub-query found them).
    pub fn new(adapter: Arc<SearchAdapter>, session: Arc<Mutex<SessionLog>>, keyword: impl Into<String>) -> Self {
        Self {
            adapter,
            session,
            keyword: keyword.into(),
        }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &'static str {
        "serper_search_reels_batch"
    }

    fn description(&self) -> &'static str {
        "Search for Instagram Reels matching one or more queries and record any newly discovered URLs."
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "queries": {
                    "type": "array",
                    "items": {"type": "string"},
                    "minItems": MIN_QUERIES,
                    "maxItems": MAX_QUERIES,
                }
            },
            "required": ["queries"],
            "additionalProperties": false,
        })
    }

    async fn call(&self, input: ToolInput) -> Result<String> {
        let queries = input.field_str_array("queries")?;
        if let Err(packet) = validate_len("queries", queries.len(), MIN_QUERIES, MAX_QUERIES) {
            return Ok(packet);
        }

        reelscout_core::log_event::tool_request(self.name(), queries.len());
        let found_urls = self.adapter.search_reels_batch(&queries).await?;

        let now = Utc::now();
        let mut new_count = 0;
        let mut sample_urls = Vec::new();
        {
            let mut session = self.session.lock().await;
            for url in &found_urls {
                if session.get(url).is_none() {
                    new_count += 1;
                    if sample_urls.len() < SAMPLE_URLS {
                        sample_urls.push(url.clone());
                    }
                    session.upsert(Reel::discovered(url.clone(), &self.keyword, now), now);
                } else {
                    session.upsert(
                        crate::patch::status_patch(url, &self.keyword, Status::Discovered, now),
                        now,
                    );
                }
            }
            session.flush()?;
        }

        reelscout_core::log_event::tool_response(self.name(), found_urls.len(), 0, "continue hydrating candidate URLs");
        Ok(json!({
            "queries": queries.len(),
            "found": found_urls.len(),
            "new": new_count,
            "sample_urls": sample_urls,
        })
        .to_string())
    }
}
