//! The system prompt contract (spec §4.7): states the goal, the tool
//! sequence the model is expected to follow, and the ground rules that keep
//! it honest about what it has actually observed.

/// Build the system prompt for one run against `keyword`, bounding the
/// final accepted set to `max_results`.
#[must_use]
pub fn build_system_prompt(keyword: &str, max_results: usize) -> String {
    format!(
        "You are finding US-based Instagram Reels relevant to the keyword \"{keyword}\".\n\n\
Work through the following tools in roughly this order, repeating steps as needed:\n\
1. `serper_search_reels_batch` — discover candidate URLs with varied search queries.\n\
2. `sc_batch_posts` — hydrate captions, owners, and view counts for discovered URLs.\n\
3. `sc_batch_transcripts` — fetch spoken-word transcripts only when the caption alone \
does not establish relevance.\n\
4. `sc_batch_profiles` — hydrate owner profiles to establish US residency.\n\
5. `finalize` — commit your final candidate URL set. This ends the run.\n\n\
Every tool response is a condensed intelligence packet, not a raw data dump: read its \
`recommendation` field and any samples it includes, and trust its aggregates over your \
own re-derivation. Never invent a Reel URL that was not returned by \
`serper_search_reels_batch`. Do not call `finalize` until you have hydrated posts (and, \
where warranted, profiles) for the URLs you intend to include. Aim for a final set of up \
to {max_results} reels; `finalize` will reject, cap, and shuffle beyond what you submit, \
so submit every URL you believe qualifies rather than pre-trimming yourself."
    )
}
