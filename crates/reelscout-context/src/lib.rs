//! Smart context builders (spec §4.5): pure functions that condense raw
//! provider batches into compact, LLM-facing intelligence packets. Every
//! builder here is side-effect free so it can be unit- and property-tested
//! without a network or filesystem.

pub mod keyword;
pub mod post_context;
pub mod profile_context;
pub mod quality;
pub mod transcript_context;

pub use post_context::{build_post_context, PostContext};
pub use profile_context::{build_profile_context, ProfileContext};
pub use quality::QualityScore;
pub use transcript_context::{build_transcript_context, TranscriptContext};

#[cfg(test)]
mod size_bound_tests {
    use super::*;
    use reelscout_providers::{PostBrief, TranscriptResult};

    const HARD_CAP_BYTES: usize = 8 * 1024;

    fn many_posts(n: usize) -> Vec<PostBrief> {
        (0..n)
            .map(|i| PostBrief {
                url: format!("https://www.instagram.com/reel/R{i}"),
                shortcode: Some(format!("R{i}")),
                caption: Some("a moderately long caption about airpods pro".repeat(3)),
                owner_handle: Some(format!("owner{}", i % 7)),
                owner_name: Some("Name".to_string()),
                is_verified: Some(true),
                is_video: Some(true),
                product_type: Some("clips".to_string()),
                views: Some(1000 + i as u64),
                taken_at_iso: Some("2024-01-01T00:00:00Z".to_string()),
                thumbnail: Some("https://example.com/t.jpg".to_string()),
                location_name: Some("Austin, Texas".to_string()),
            })
            .collect()
    }

    #[test]
    fn post_context_stays_under_the_hard_cap() {
        let posts = many_posts(200);
        let ctx = build_post_context(&posts, "airpods pro");
        let bytes = serde_json::to_vec(&ctx).unwrap();
        assert!(bytes.len() <= HARD_CAP_BYTES, "post context was {} bytes", bytes.len());
    }

    #[test]
    fn transcript_context_stays_under_the_hard_cap() {
        let long_text = "talking about airpods pro all day long ".repeat(50);
        let transcripts: Vec<TranscriptResult> = (0..200)
            .map(|i| TranscriptResult {
                url: format!("https://www.instagram.com/reel/R{i}"),
                transcript: Some(long_text.clone()),
            })
            .collect();
        let ctx = build_transcript_context(&transcripts, "airpods pro", 500);
        let bytes = serde_json::to_vec(&ctx).unwrap();
        assert!(bytes.len() <= HARD_CAP_BYTES, "transcript context was {} bytes", bytes.len());
    }

    proptest::proptest! {
        #[test]
        fn post_context_size_bound_holds_for_any_batch_size(n in 0usize..500, caption_len in 0usize..400) {
            let posts: Vec<PostBrief> = (0..n)
                .map(|i| PostBrief {
                    url: format!("https://www.instagram.com/reel/R{i}"),
                    shortcode: Some(format!("R{i}")),
                    caption: Some("x".repeat(caption_len)),
                    owner_handle: Some(format!("owner{}", i % 11)),
                    owner_name: None,
                    is_verified: None,
                    is_video: Some(true),
                    product_type: None,
                    views: Some(i as u64),
                    taken_at_iso: None,
                    thumbnail: None,
                    location_name: None,
                })
                .collect();
            let ctx = build_post_context(&posts, "airpods pro");
            let bytes = serde_json::to_vec(&ctx).unwrap();
            proptest::prop_assert!(bytes.len() <= HARD_CAP_BYTES);
        }
    }
}
