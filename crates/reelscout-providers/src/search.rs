//! Web search adapter (spec §4.3.1).

use crate::http::{classify_status, ProviderClient};
use reelscout_core::error::{Error, Result};
use reelscout_core::model::REEL_URL_PREFIX;
use serde_json::Value;
use std::time::Duration;

/// Configuration for the web search adapter's ranking hints. These are
/// ranking-only; they never filter results (spec §4.3.1).
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// API key sent as `X-API-KEY`.
    pub api_key: String,
    /// Organic results requested per query.
    pub num: u32,
    /// Geography ranking hint.
    pub gl: String,
    /// Language ranking hint.
    pub hl: String,
    /// Location string ranking hint.
    pub location: String,
}

/// Thin client over the web search provider's batch search endpoint.
pub struct SearchAdapter {
    client: ProviderClient,
    endpoint: String,
    config: SearchConfig,
}

impl SearchAdapter {
    /// Construct an adapter with the given endpoint, timeout and
    /// concurrency bound.
    pub fn new(
        endpoint: impl Into<String>,
        config: SearchConfig,
        timeout: Duration,
        max_concurrency: usize,
    ) -> Result<Self> {
        Ok(Self {
            client: ProviderClient::new(timeout, max_concurrency)?,
            endpoint: endpoint.into(),
            config,
        })
    }

    fn build_query(&self, raw: &str) -> String {
        format!("site:instagram.com/reel {raw} United States")
    }

    /// Search for reels matching each of `queries`, returning a stable,
    /// de-duplicated, normalized list of reel URLs discovered across all of
    /// them.
    ///
    /// One batch POST is attempted first; if the provider rejects the array
    /// body (any non-2xx), the adapter falls back to fanning the queries out
    /// individually through the shared concurrency pool.
    pub async fn search_reels_batch(&self, queries: &[String]) -> Result<Vec<String>> {
        let bodies: Vec<Value> = queries
            .iter()
            .map(|q| {
                serde_json::json!({
                    "q": self.build_query(q),
                    "gl": self.config.gl,
                    "hl": self.config.hl,
                    "location": self.config.location,
                    "num": self.config.num,
                })
            })
            .collect();

        let trees = match self.post_batch(&bodies).await {
            Ok(v) => v,
            Err(_) => self.post_each(&bodies).await?,
        };

        let mut seen = std::collections::HashSet::new();
        let mut ordered = Vec::new();
        for tree in &trees {
            for link in extract_reel_links(tree) {
                if let Some(normalized) = normalize_reel_url(&link) {
                    if seen.insert(normalized.clone()) {
                        ordered.push(normalized);
                    }
                }
            }
        }
        Ok(ordered)
    }

    async fn post_batch(&self, bodies: &[Value]) -> Result<Vec<Value>> {
        let _permit = self.client.acquire().await;
        let response = self
            .client
            .inner()
            .post(&self.endpoint)
            .header("X-API-KEY", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(bodies)
            .send()
            .await
            .map_err(|e| Error::transient(format!("search request failed: {e}")))?;

        respond_as_array(response).await
    }

    async fn post_each(&self, bodies: &[Value]) -> Result<Vec<Value>> {
        let mut out = Vec::with_capacity(bodies.len());
        for body in bodies {
            let _permit = self.client.acquire().await;
            let response = self
                .client
                .inner()
                .post(&self.endpoint)
                .header("X-API-KEY", &self.config.api_key)
                .header("Content-Type", "application/json")
                .json(body)
                .send()
                .await
                .map_err(|e| Error::transient(format!("search request failed: {e}")))?;

            if let Some(kind) = classify_status(response.status()) {
                return Err(Error::new(
                    kind,
                    format!("search provider returned {}", response.status()),
                ));
            }
            let value: Value = response
                .json()
                .await
                .map_err(|e| Error::invalid_response(format!("non-JSON search response: {e}")))?;
            out.push(value);
        }
        Ok(out)
    }
}

async fn respond_as_array(response: reqwest::Response) -> Result<Vec<Value>> {
    if let Some(kind) = classify_status(response.status()) {
        return Err(Error::new(
            kind,
            format!("search provider returned {}", response.status()),
        ));
    }
    let value: Value = response
        .json()
        .await
        .map_err(|e| Error::invalid_response(format!("non-JSON search response: {e}")))?;
    match value {
        Value::Array(items) => Ok(items),
        other => Ok(vec![other]),
    }
}

/// Walk the whole JSON tree and collect every string found under a key
/// literally named `link`, regardless of nesting depth (spec §4.3.1: the
/// provider's `organic` array is the common case, but sections may nest).
fn extract_reel_links(tree: &Value) -> Vec<String> {
    let mut out = Vec::new();
    walk(tree, &mut out);
    return out;

    fn walk(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::Object(map) => {
                for (key, v) in map {
                    if key == "link" {
                        if let Some(s) = v.as_str() {
                            out.push(s.to_string());
                        }
                    }
                    walk(v, out);
                }
            }
            Value::Array(items) => {
                for item in items {
                    walk(item, out);
                }
            }
            Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {}
        }
    }
}

/// Normalize any Instagram reel URL to the canonical
/// `https://www.instagram.com/reel/{shortcode}` form: drop trailing slash
/// and query string, require the `/reel/` path at any depth.
///
/// Idempotent: `normalize_reel_url(normalize_reel_url(u)) == normalize_reel_url(u)`.
#[must_use]
pub fn normalize_reel_url(raw: &str) -> Option<String> {
    if !raw.starts_with(REEL_URL_PREFIX) {
        return None;
    }
    let without_query = raw.split(['?', '#']).next().unwrap_or(raw);
    let shortcode = without_query
        .strip_prefix(REEL_URL_PREFIX)?
        .trim_end_matches('/');
    if shortcode.is_empty() || !shortcode.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return None;
    }
    Some(format!("{REEL_URL_PREFIX}{shortcode}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_trailing_slash_and_query() {
        assert_eq!(
            normalize_reel_url("https://www.instagram.com/reel/Cabc123/?utm=1"),
            Some("https://www.instagram.com/reel/Cabc123".to_string())
        );
    }

    #[test]
    fn rejects_non_reel_links() {
        assert_eq!(normalize_reel_url("https://www.instagram.com/p/Cabc123/"), None);
        assert_eq!(normalize_reel_url("https://example.com/reel/Cabc123"), None);
    }

    #[test]
    fn extracts_links_at_any_depth() {
        let tree = serde_json::json!({
            "organic": [
                {"link": "https://www.instagram.com/reel/A1/", "title": "x"},
                {"nested": {"link": "https://www.instagram.com/reel/B2"}},
            ],
            "unrelated": {"link": "https://example.com/x"},
        });
        let links = extract_reel_links(&tree);
        assert!(links.contains(&"https://www.instagram.com/reel/A1/".to_string()));
        assert!(links.contains(&"https://www.instagram.com/reel/B2".to_string()));
        assert!(links.contains(&"https://example.com/x".to_string()));
    }

    proptest::proptest! {
        #[test]
        fn normalize_is_idempotent(shortcode in "[A-Za-z0-9_-]{5,15}") {
            let url = format!("{REEL_URL_PREFIX}{shortcode}/?x=1");
            let once = normalize_reel_url(&url);
            if let Some(n1) = once {
                let twice = normalize_reel_url(&n1);
                prop_assert_eq!(Some(n1), twice);
            }
        }
    }
}
