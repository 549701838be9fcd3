//! Profile adapter (spec §4.3.4).

use crate::http::{classify_status, ProviderClient};
use reelscout_core::error::{Error, Result};
use reelscout_core::model::Profile;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;

/// Thin client over the Instagram profile provider.
pub struct ProfileAdapter {
    client: ProviderClient,
    endpoint: String,
    api_key: String,
}

impl ProfileAdapter {
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

    /// Fetch profile briefs for each distinct handle in `handles`
    /// (duplicates are collapsed before any request is made). A per-handle
    /// failure yields no entry for that handle rather than aborting the
    /// batch.
    pub async fn batch_profiles(&self, handles: &[String]) -> Result<Vec<Profile>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for handle in handles {
            if !seen.insert(handle.clone()) {
                continue;
            }
            let _permit = self.client.acquire().await;
            let response = self
                .client
                .inner()
                .get(&self.endpoint)
                .query(&[("handle", handle.as_str())])
                .header("X-API-KEY", &self.api_key)
                .send()
                .await
                .map_err(|e| Error::transient(format!("profile request failed: {e}")))?;

            if let Some(kind) = classify_status(response.status()) {
                reelscout_core::log_event::warn(
                    Some("sc_batch_profiles"),
                    &format!("{handle}: provider returned {kind}"),
                );
                continue;
            }

            let tree: Value = match response.json().await {
                Ok(v) => v,
                Err(e) => {
                    reelscout_core::log_event::warn(
                        Some("sc_batch_profiles"),
                        &format!("{handle}: non-JSON response: {e}"),
                    );
                    continue;
                }
            };

            out.push(extract_profile(handle, &tree));
        }
        Ok(out)
    }
}

/// Extract a [`Profile`] from a raw `data.user` response tree.
#[must_use]
pub fn extract_profile(handle: &str, tree: &Value) -> Profile {
    let user = &tree["data"]["user"];
    Profile {
        handle: user["username"].as_str().unwrap_or(handle).to_string(),
        full_name: user["full_name"].as_str().map(str::to_string),
        biography: user["biography"].as_str().map(str::to_string),
        business_address_json: user["business_address_json"].as_str().map(str::to_string),
        external_url: user["external_url"].as_str().map(str::to_string),
        is_verified: user["is_verified"].as_bool(),
        followers: user["edge_followed_by"]["count"].as_u64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_nested_user_shape() {
        let tree = serde_json::json!({
            "data": {
                "user": {
                    "username": "creator",
                    "biography": "Austin, TX based creator",
                    "external_url": "https://creator.com",
                    "is_verified": false,
                    "edge_followed_by": {"count": 1200},
                }
            }
        });
        let profile = extract_profile("creator", &tree);
        assert_eq!(profile.followers, Some(1200));
        assert_eq!(profile.external_url.as_deref(), Some("https://creator.com"));
    }
}
