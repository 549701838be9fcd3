//! Post adapter (spec §4.3.2).
//!
//! Reads the nested `data.xdt_shortcode_media` shape. Deliberately never
//! requests the provider's trimmed response variant: the trimmed shape omits
//! owner data, which this adapter's callers always need.

use crate::http::{classify_status, ProviderClient};
use chrono::{DateTime, TimeZone, Utc};
use reelscout_core::error::{Error, Result};
use serde_json::Value;
use std::time::Duration;

/// Post metadata hydrated for one reel URL.
#[derive(Debug, Clone, Default)]
pub struct PostBrief {
    /// The URL this brief was fetched for.
    pub url: String,
    /// Shortcode extracted from the provider response.
    pub shortcode: Option<String>,
    /// First caption edge's text.
    pub caption: Option<String>,
    /// Owner handle, no leading `@`.
    pub owner_handle: Option<String>,
    /// Owner display name.
    pub owner_name: Option<String>,
    /// Owner verification flag.
    pub is_verified: Option<bool>,
    /// Whether the media is a video.
    pub is_video: Option<bool>,
    /// Provider product type string.
    pub product_type: Option<String>,
    /// View or play count.
    pub views: Option<u64>,
    /// ISO-8601 UTC timestamp.
    pub taken_at_iso: Option<String>,
    /// Thumbnail URL.
    pub thumbnail: Option<String>,
    /// Tagged location name.
    pub location_name: Option<String>,
}

/// Thin client over the Instagram post provider.
pub struct PostAdapter {
    client: ProviderClient,
    endpoint: String,
    api_key: String,
}

impl PostAdapter {
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

    /// Fetch post metadata for each of `urls`. A provider failure for one
    /// URL does not abort the batch: the offending entry is simply omitted
    /// from the result (callers treat a missing entry as "not hydrated").
    pub async fn batch_posts(&self, urls: &[String]) -> Result<Vec<PostBrief>> {
        let mut out = Vec::with_capacity(urls.len());
        for url in urls {
            let _permit = self.client.acquire().await;
            let response = self
                .client
                .inner()
                .get(&self.endpoint)
                .query(&[("url", url.as_str())])
                .header("X-API-KEY", &self.api_key)
                .send()
                .await
                .map_err(|e| Error::transient(format!("post request failed: {e}")))?;

            if let Some(kind) = classify_status(response.status()) {
                if kind == reelscout_core::error::ErrorKind::OutOfCredits {
                    return Err(Error::out_of_credits("post provider is out of credits"));
                }
                reelscout_core::log_event::warn(
                    Some("sc_batch_posts"),
                    &format!("{url}: provider returned {kind}"),
                );
                continue;
            }

            let tree: Value = match response.json().await {
                Ok(v) => v,
                Err(e) => {
                    reelscout_core::log_event::warn(
                        Some("sc_batch_posts"),
                        &format!("{url}: non-JSON response: {e}"),
                    );
                    continue;
                }
            };

            let mut brief = extract_post_brief(&tree);
            brief.url = url.clone();
            if brief.owner_handle.is_none() {
                reelscout_core::log_event::warn(
                    Some("sc_batch_posts"),
                    &format!("{url}: owner username missing from response"),
                );
            }
            out.push(brief);
        }
        Ok(out)
    }
}

/// Extract a [`PostBrief`] from a raw `data.xdt_shortcode_media` response
/// tree. Every field is best-effort: a missing or malformed sub-field
/// degrades to `None` rather than failing the whole extraction.
#[must_use]
pub fn extract_post_brief(tree: &Value) -> PostBrief {
    let media = &tree["data"]["xdt_shortcode_media"];

    let caption = media["edge_media_to_caption"]["edges"]
        .as_array()
        .and_then(|edges| edges.first())
        .and_then(|edge| edge["node"]["text"].as_str())
        .map(str::to_string);

    let owner_handle = media["owner"]["username"].as_str().map(str::to_string);
    let owner_name = media["owner"]["full_name"].as_str().map(str::to_string);
    let is_verified = media["owner"]["is_verified"].as_bool();

    let is_video = media["is_video"].as_bool();
    let product_type = media["product_type"].as_str().map(str::to_string);

    let views = media["video_view_count"]
        .as_u64()
        .or_else(|| media["video_play_count"].as_u64());

    let taken_at_iso = media["taken_at_timestamp"]
        .as_i64()
        .and_then(epoch_to_iso);

    let thumbnail = media["thumbnail_src"]
        .as_str()
        .or_else(|| media["display_url"].as_str())
        .map(str::to_string);

    let location_name = media["location"]["name"].as_str().map(str::to_string);

    let shortcode = media["shortcode"].as_str().map(str::to_string);

    PostBrief {
        url: String::new(),
        shortcode,
        caption,
        owner_handle,
        owner_name,
        is_verified,
        is_video,
        product_type,
        views,
        taken_at_iso,
        thumbnail,
        location_name,
    }
}

/// Convert a provider timestamp to an ISO-8601 UTC string. Timestamps with
/// at most 10 digits are treated as seconds; longer values as milliseconds
/// (spec §4.3.2).
fn epoch_to_iso(value: i64) -> Option<String> {
    let digits = value.unsigned_abs().to_string().len();
    let dt: Option<DateTime<Utc>> = if digits <= 10 {
        Utc.timestamp_opt(value, 0).single()
    } else {
        Utc.timestamp_millis_opt(value).single()
    };
    dt.map(|d| d.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_full_media_shape() {
        let tree = serde_json::json!({
            "data": {
                "xdt_shortcode_media": {
                    "shortcode": "Cabc123",
                    "is_video": true,
                    "product_type": "clips",
                    "video_view_count": 4200,
                    "taken_at_timestamp": 1_700_000_000,
                    "thumbnail_src": "https://example.com/thumb.jpg",
                    "location": {"name": "Austin, Texas"},
                    "owner": {
                        "username": "creator_handle",
                        "full_name": "Creator Name",
                        "is_verified": true,
                    },
                    "edge_media_to_caption": {
                        "edges": [{"node": {"text": "hello world"}}]
                    },
                }
            }
        });

        let brief = extract_post_brief(&tree);
        assert_eq!(brief.owner_handle.as_deref(), Some("creator_handle"));
        assert_eq!(brief.caption.as_deref(), Some("hello world"));
        assert_eq!(brief.views, Some(4200));
        assert!(brief.taken_at_iso.unwrap().starts_with("2023-11-14"));
    }

    #[test]
    fn missing_owner_degrades_to_none() {
        let tree = serde_json::json!({"data": {"xdt_shortcode_media": {"is_video": true}}});
        let brief = extract_post_brief(&tree);
        assert_eq!(brief.owner_handle, None);
        assert_eq!(brief.is_video, Some(true));
    }

    #[test]
    fn millisecond_timestamp_detected_by_digit_count() {
        assert!(epoch_to_iso(1_700_000_000).unwrap().starts_with("2023-11-14"));
        assert!(epoch_to_iso(1_700_000_000_000).unwrap().starts_with("2023-11-14"));
    }
}
