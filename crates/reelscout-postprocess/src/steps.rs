//! US filter, per-creator cap, and final slice (spec §4.8 steps 1, 2, 4).

use reelscout_core::model::{RelevanceDecision, Reel, UsDecision};
use std::collections::BTreeMap;

/// Step 1: keep rows decided `US`, and `unknown` rows too when `allow_unknown`
/// is set (spec §4.8.1). Drops `non-US` unconditionally.
#[must_use]
pub fn us_filter(rows: Vec<Reel>, allow_unknown: bool) -> Vec<Reel> {
    rows.into_iter()
        .filter(|row| match row.us_decision {
            UsDecision::Us => true,
            UsDecision::Unknown => allow_unknown,
            UsDecision::NonUs => false,
        })
        .collect()
}

fn relevance_rank(decision: RelevanceDecision) -> u8 {
    match decision {
        RelevanceDecision::Relevant => 0,
        RelevanceDecision::Unknown => 1,
        RelevanceDecision::Irrelevant => 2,
    }
}

/// Step 2: stable-sort by (relevant-first, views desc, `row_updated_at`
/// desc), then keep at most `cap` rows per `owner_handle`. Rows with no
/// owner share a single reserved bucket of the same size (spec §4.8.2).
#[must_use]
pub fn per_creator_cap(mut rows: Vec<Reel>, cap: usize) -> Vec<Reel> {
    rows.sort_by(|a, b| {
        relevance_rank(a.relevance_decision)
            .cmp(&relevance_rank(b.relevance_decision))
            .then_with(|| b.views.unwrap_or(0).cmp(&a.views.unwrap_or(0)))
            .then_with(|| b.row_updated_at.cmp(&a.row_updated_at))
    });

    let mut counts: BTreeMap<Option<String>, usize> = BTreeMap::new();
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        let key = row.owner_handle.clone();
        let count = counts.entry(key).or_insert(0);
        if *count < cap {
            *count += 1;
            kept.push(row);
        }
    }
    kept
}

/// Step 4: slice to at most `max_results`, returning `(accepted, rejected)`.
/// Rows beyond `max_results` are rejected even though they survived the
/// earlier steps (spec §4.8.4).
#[must_use]
pub fn slice_to_max_results(rows: Vec<Reel>, max_results: usize) -> (Vec<Reel>, Vec<Reel>) {
    if rows.len() <= max_results {
        (rows, Vec::new())
    } else {
        let mut rows = rows;
        let rejected = rows.split_off(max_results);
        (rows, rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn reel(url: &str, owner: Option<&str>, views: u64, relevance: RelevanceDecision) -> Reel {
        let now = Utc::now();
        let mut r = Reel::discovered(url, "kw", now);
        r.owner_handle = owner.map(str::to_string);
        r.views = Some(views);
        r.relevance_decision = relevance;
        r
    }

    #[test]
    fn us_filter_drops_non_us_keeps_unknown_when_allowed() {
        let mut us = reel("u1", Some("a"), 1, RelevanceDecision::Relevant);
        us.us_decision = UsDecision::Us;
        let mut non_us = reel("u2", Some("a"), 1, RelevanceDecision::Relevant);
        non_us.us_decision = UsDecision::NonUs;
        let unknown = reel("u3", Some("a"), 1, RelevanceDecision::Relevant);

        let kept = us_filter(vec![us, non_us, unknown], true);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.us_decision != UsDecision::NonUs));
    }

    #[test]
    fn us_filter_drops_unknown_when_disallowed() {
        let unknown = reel("u1", Some("a"), 1, RelevanceDecision::Relevant);
        let kept = us_filter(vec![unknown], false);
        assert!(kept.is_empty());
    }

    #[test]
    fn per_creator_cap_limits_per_owner() {
        let rows = vec![
            reel("u1", Some("a"), 100, RelevanceDecision::Relevant),
            reel("u2", Some("a"), 90, RelevanceDecision::Relevant),
            reel("u3", Some("a"), 80, RelevanceDecision::Relevant),
        ];
        let capped = per_creator_cap(rows, 2);
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].url, "u1");
        assert_eq!(capped[1].url, "u2");
    }

    #[test]
    fn per_creator_cap_prefers_relevant_then_views() {
        let mut low = reel("u1", Some("a"), 10, RelevanceDecision::Irrelevant);
        low.row_updated_at = Utc::now();
        let mut high = reel("u2", Some("a"), 10, RelevanceDecision::Relevant);
        high.row_updated_at = Utc::now() - Duration::seconds(5);
        let capped = per_creator_cap(vec![low, high], 1);
        assert_eq!(capped[0].url, "u2");
    }

    #[test]
    fn slice_splits_overflow_into_rejected() {
        let rows = vec![reel("u1", None, 1, RelevanceDecision::Relevant), reel("u2", None, 1, RelevanceDecision::Relevant)];
        let (accepted, rejected) = slice_to_max_results(rows, 1);
        assert_eq!(accepted.len(), 1);
        assert_eq!(rejected.len(), 1);
    }
}
