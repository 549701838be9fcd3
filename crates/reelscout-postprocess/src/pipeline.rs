//! The four-step post-processing pipeline (spec §4.8), composed from
//! [`crate::steps`] and [`crate::shuffle`].

use crate::shuffle::shuffle_no_adjacent_owner;
use crate::steps::{per_creator_cap, slice_to_max_results, us_filter};
use reelscout_core::model::Reel;
use std::collections::HashSet;

/// Tunables the pipeline needs beyond the row set itself.
#[derive(Debug, Clone, Copy)]
pub struct PostProcessConfig {
    /// Whether `us_decision == unknown` rows survive the US filter.
    pub allow_unknown_us: bool,
    /// Max accepted rows per `owner_handle` (spec §4.8.2).
    pub per_creator_cap: usize,
    /// Target size of the final accepted set.
    pub max_results: usize,
    /// Deterministic shuffle seed, derived from the session id.
    pub shuffle_seed: u64,
}

/// Outcome of running the pipeline over one `finalize` call's candidate set.
#[derive(Debug, Clone)]
pub struct PostProcessOutcome {
    /// URLs selected by the pipeline, in final presentation order.
    pub accepted: Vec<String>,
    /// URLs from the input set that did not survive to the accepted list.
    pub rejected: Vec<String>,
}

/// Run the full pipeline: US filter, per-creator cap, shuffle, slice
/// (spec §4.8). `candidates` is the set of rows `finalize` named, already
/// hydrated; every one of them ends up in exactly one of the two output
/// lists.
#[must_use]
pub fn run(candidates: Vec<Reel>, config: &PostProcessConfig) -> PostProcessOutcome {
    let input_urls: HashSet<String> = candidates.iter().map(|r| r.url.clone()).collect();

    let filtered = us_filter(candidates, config.allow_unknown_us);
    let capped = per_creator_cap(filtered, config.per_creator_cap);
    let shuffled = shuffle_no_adjacent_owner(capped, config.shuffle_seed);
    let (accepted_rows, _overflow) = slice_to_max_results(shuffled, config.max_results);

    let accepted: Vec<String> = accepted_rows.into_iter().map(|r| r.url).collect();
    let accepted_set: HashSet<&String> = accepted.iter().collect();
    let rejected: Vec<String> = input_urls
        .into_iter()
        .filter(|url| !accepted_set.contains(url))
        .collect();

    PostProcessOutcome { accepted, rejected }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reelscout_core::model::{RelevanceDecision, UsDecision};

    fn reel(url: &str, owner: &str, us: UsDecision) -> Reel {
        let mut r = Reel::discovered(url, "kw", Utc::now());
        r.owner_handle = Some(owner.to_string());
        r.us_decision = us;
        r.relevance_decision = RelevanceDecision::Relevant;
        r.views = Some(1);
        r
    }

    #[test]
    fn every_candidate_ends_up_accepted_or_rejected() {
        let rows = vec![
            reel("u1", "a", UsDecision::Us),
            reel("u2", "a", UsDecision::Us),
            reel("u3", "b", UsDecision::NonUs),
        ];
        let config = PostProcessConfig {
            allow_unknown_us: true,
            per_creator_cap: 1,
            max_results: 10,
            shuffle_seed: 1,
        };
        let outcome = run(rows, &config);
        assert_eq!(outcome.accepted.len() + outcome.rejected.len(), 3);
        assert!(outcome.rejected.contains(&"u3".to_string()));
    }

    #[test]
    fn max_results_bounds_the_accepted_set() {
        let rows = (0..5)
            .map(|i| reel(&format!("u{i}"), &format!("owner{i}"), UsDecision::Us))
            .collect();
        let config = PostProcessConfig {
            allow_unknown_us: true,
            per_creator_cap: 5,
            max_results: 2,
            shuffle_seed: 1,
        };
        let outcome = run(rows, &config);
        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(outcome.rejected.len(), 3);
    }
}
