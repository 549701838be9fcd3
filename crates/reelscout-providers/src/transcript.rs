//! Transcript adapter (spec §4.3.3).
//!
//! Contract point: the provider's field is literally named `text`, nested
//! under `transcripts[0]`, not `transcript`. Per-URL failures swallow into
//! `None` rather than failing the batch.

use crate::http::{classify_status, ProviderClient};
use reelscout_core::error::{Error, ErrorKind, Result};
use serde_json::Value;
use std::time::Duration;

/// One URL's transcript fetch result.
#[derive(Debug, Clone)]
pub struct TranscriptResult {
    /// The URL this result answers.
    pub url: String,
    /// Transcript text, or `None` if absent/empty/failed.
    pub transcript: Option<String>,
}

/// Thin client over the Instagram transcript provider.
pub struct TranscriptAdapter {
    client: ProviderClient,
    endpoint: String,
    api_key: String,
}

impl TranscriptAdapter {
    /// Construct an adapter with the given endpoint, timeout and
    /// concurrency bound.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
        max_concurrency: usize,
    ) -> Result<Self> {
        Ok(Self {
            client: ProviderClient::new(timeout, max_concurrency)?,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Fetch transcripts for each of `urls`. Unrecoverable provider errors
    /// (`out_of_credits`, `auth_failed`) still propagate; everything else
    /// degrades that one URL to `transcript: None`.
    pub async fn batch_transcripts(&self, urls: &[String]) -> Result<Vec<TranscriptResult>> {
        let mut out = Vec::with_capacity(urls.len());
        for url in urls {
            let _permit = self.client.acquire().await;
            let transcript = match self.fetch_one(url).await {
                Ok(t) => t,
                Err(e) if matches!(e.kind(), ErrorKind::OutOfCredits | ErrorKind::AuthFailed) => {
                    return Err(e)
                }
                Err(e) => {
                    reelscout_core::log_event::warn(
                        Some("sc_batch_transcripts"),
                        &format!("{url}: {e}"),
                    );
                    None
                }
            };
            out.push(TranscriptResult {
                url: url.clone(),
                transcript,
            });
        }
        Ok(out)
    }

    async fn fetch_one(&self, url: &str) -> Result<Option<String>> {
        let response = self
            .client
            .inner()
            .get(&self.endpoint)
            .query(&[("url", url)])
            .header("X-API-KEY", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::transient(format!("transcript request failed: {e}")))?;

        if let Some(kind) = classify_status(response.status()) {
            return Err(Error::new(
                kind,
                format!("transcript provider returned {}", response.status()),
            ));
        }

        let tree: Value = response
            .json()
            .await
            .map_err(|e| Error::invalid_response(format!("non-JSON transcript response: {e}")))?;

        Ok(extract_transcript_text(&tree))
    }
}

/// Pull the transcript text out of `{success, transcripts: [{id, shortcode,
/// text}]}`. Empty strings and missing fields both normalize to `None`.
#[must_use]
pub fn extract_transcript_text(tree: &Value) -> Option<String> {
    let text = tree["transcripts"]
        .as_array()
        .and_then(|items| items.first())
        .and_then(|item| item["text"].as_str())?;
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_transcript_text_field() {
        let tree = serde_json::json!({
            "success": true,
            "transcripts": [{"id": "1", "shortcode": "Cabc", "text": "hello there"}]
        });
        assert_eq!(extract_transcript_text(&tree).as_deref(), Some("hello there"));
    }

    #[test]
    fn empty_string_normalizes_to_none() {
        let tree = serde_json::json!({"transcripts": [{"text": ""}]});
        assert_eq!(extract_transcript_text(&tree), None);
    }

    #[test]
    fn missing_transcripts_normalizes_to_none() {
        let tree = serde_json::json!({"success": false});
        assert_eq!(extract_transcript_text(&tree), None);
    }
}
