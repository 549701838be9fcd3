//! `build_post_context` (spec §4.5.1): condenses a batch of post briefs into
//! a compact intelligence packet for the LLM.

use crate::keyword::{contains_keyword, relevance_hint, RelevanceHint};
use crate::quality::{percentage, quality_score, QualityScore};
use reelscout_providers::PostBrief;
use serde::Serialize;
use std::collections::HashMap;

const CAPTION_PREVIEW_CHARS: usize = 100;
const TOP_OWNERS: usize = 3;
const SAMPLE_COUNT: usize = 3;

/// Keyword match summary within captions.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordAnalysis {
    /// Number of captions containing the keyword.
    pub in_captions: usize,
    /// `in_captions / total` as a percentage string.
    pub match_rate: String,
}

/// One owner's share of the batch.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerCount {
    /// Owner handle.
    pub owner_handle: String,
    /// Number of posts by this owner in the batch.
    pub count: usize,
}

/// One representative post surfaced to the LLM.
#[derive(Debug, Clone, Serialize)]
pub struct PostSample {
    /// The post's URL.
    pub url: String,
    /// Owner handle, if hydrated.
    pub owner_handle: Option<String>,
    /// First [`CAPTION_PREVIEW_CHARS`] characters of the caption.
    pub caption_preview: String,
    /// View count, if known.
    pub views: Option<u64>,
    /// Tagged location name, if known.
    pub location_name: Option<String>,
    /// Keyword relevance hint for this sample's caption.
    pub relevance_hint: RelevanceHint,
}

/// Compact summary of a post-hydration batch.
#[derive(Debug, Clone, Serialize)]
pub struct PostContext {
    /// Number of posts in the batch.
    pub total: usize,
    /// Number of posts with a non-empty caption.
    pub with_captions: usize,
    /// Average view count across posts with a known view count.
    pub avg_views: Option<f64>,
    /// Distinct owner handles in the batch.
    pub unique_owners: usize,
    /// Keyword-in-caption match summary.
    pub keyword_analysis: KeywordAnalysis,
    /// Top owners by post count.
    pub diversity: Vec<OwnerCount>,
    /// Overall quality verdict.
    pub quality_score: QualityScore,
    /// Representative samples, diverse by owner where possible.
    pub samples: Vec<PostSample>,
    /// Short imperative recommendation driven by `quality_score`.
    pub recommendation: String,
}

fn recommendation_for(score: QualityScore) -> &'static str {
    match score {
        QualityScore::Excellent => "Strong signal; proceed toward finalize with these candidates.",
        QualityScore::Good => "Decent signal; fetch transcripts for the weaker candidates before finalizing.",
        QualityScore::Fair => "Weak signal; broaden the search or request more candidates.",
        QualityScore::Poor => "Poor signal; try a different or broader keyword.",
    }
}

/// Build a [`PostContext`] from a batch of hydrated posts (spec §4.5.1).
#[must_use]
pub fn build_post_context(posts: &[PostBrief], keyword: &str) -> PostContext {
    let total = posts.len();
    let with_captions = posts.iter().filter(|p| !p.caption.as_deref().unwrap_or("").is_empty()).count();

    let views: Vec<u64> = posts.iter().filter_map(|p| p.views).collect();
    let avg_views = if views.is_empty() {
        None
    } else {
        Some(views.iter().sum::<u64>() as f64 / views.len() as f64)
    };

    let unique_owners = posts
        .iter()
        .filter_map(|p| p.owner_handle.as_deref())
        .collect::<std::collections::HashSet<_>>()
        .len();

    let in_captions = posts
        .iter()
        .filter(|p| contains_keyword(p.caption.as_deref().unwrap_or(""), keyword))
        .count();
    let keyword_analysis = KeywordAnalysis {
        in_captions,
        match_rate: percentage(in_captions, total),
    };

    let mut owner_counts: HashMap<&str, usize> = HashMap::new();
    for post in posts {
        if let Some(handle) = post.owner_handle.as_deref() {
            *owner_counts.entry(handle).or_insert(0) += 1;
        }
    }
    let mut diversity: Vec<OwnerCount> = owner_counts
        .into_iter()
        .map(|(owner_handle, count)| OwnerCount {
            owner_handle: owner_handle.to_string(),
            count,
        })
        .collect();
    diversity.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.owner_handle.cmp(&b.owner_handle)));
    diversity.truncate(TOP_OWNERS);

    let coverage_pct = (with_captions as f64 / total.max(1) as f64) * 100.0;
    let match_rate_pct = (in_captions as f64 / total.max(1) as f64) * 100.0;
    let quality = quality_score(coverage_pct, match_rate_pct);

    let samples = diverse_samples(posts, keyword);

    PostContext {
        total,
        with_captions,
        avg_views,
        unique_owners,
        keyword_analysis,
        diversity,
        quality_score: quality,
        samples,
        recommendation: recommendation_for(quality).to_string(),
    }
}

/// Pick up to [`SAMPLE_COUNT`] posts, preferring distinct owners before
/// falling back to repeats.
fn diverse_samples(posts: &[PostBrief], keyword: &str) -> Vec<PostSample> {
    let mut seen_owners = std::collections::HashSet::new();
    let mut samples = Vec::new();

    for post in posts {
        if samples.len() >= SAMPLE_COUNT {
            break;
        }
        let owner = post.owner_handle.as_deref();
        if owner.is_some_and(|o| seen_owners.contains(o)) {
            continue;
        }
        if let Some(o) = owner {
            seen_owners.insert(o.to_string());
        }
        samples.push(to_sample(post, keyword));
    }
    if samples.len() < SAMPLE_COUNT {
        for post in posts {
            if samples.len() >= SAMPLE_COUNT {
                break;
            }
            if samples.iter().any(|s| s.url == post.url) {
                continue;
            }
            samples.push(to_sample(post, keyword));
        }
    }
    samples
}

fn to_sample(post: &PostBrief, keyword: &str) -> PostSample {
    let caption = post.caption.clone().unwrap_or_default();
    let caption_preview: String = caption.chars().take(CAPTION_PREVIEW_CHARS).collect();
    PostSample {
        url: post.url.clone(),
        owner_handle: post.owner_handle.clone(),
        caption_preview,
        views: post.views,
        location_name: post.location_name.clone(),
        relevance_hint: relevance_hint(&caption, keyword),
    }
}
