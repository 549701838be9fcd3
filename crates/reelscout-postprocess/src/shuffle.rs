//! Step 3: deterministic-random shuffle with no adjacent same-owner rows
//! when combinatorially possible (spec §4.8.3).

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use reelscout_core::model::Reel;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Derive a deterministic 64-bit seed from a session id, so the same
/// session's shuffle is reproducible across post-processing reruns.
#[must_use]
pub fn seed_from_session_id(session_id: &str) -> u64 {
    let digest = Sha256::digest(session_id.as_bytes());
    u64::from_le_bytes(digest[0..8].try_into().expect("sha256 digest is at least 8 bytes"))
}

/// Whether avoiding all adjacent same-owner pairs is combinatorially
/// possible for `total` rows when the largest owner bucket has `max_count`
/// rows: `max_count <= total - max_count + 1`.
#[must_use]
pub fn no_adjacent_possible(max_count: usize, total: usize) -> bool {
    max_count <= total.saturating_sub(max_count) + 1
}

/// Interleave `rows` so no two consecutive rows share an `owner_handle`,
/// whenever [`no_adjacent_possible`] holds for the input. Falls back to a
/// best-effort, run-minimizing interleave (and a `warn` log event) when it
/// doesn't.
#[must_use]
pub fn shuffle_no_adjacent_owner(rows: Vec<Reel>, seed: u64) -> Vec<Reel> {
    if rows.len() <= 1 {
        return rows;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut buckets: BTreeMap<Option<String>, Vec<Reel>> = BTreeMap::new();
    for row in rows {
        buckets.entry(row.owner_handle.clone()).or_default().push(row);
    }
    for bucket in buckets.values_mut() {
        bucket.shuffle(&mut rng);
    }

    let total: usize = buckets.values().map(Vec::len).sum();
    let max_count = buckets.values().map(Vec::len).max().unwrap_or(0);
    if !no_adjacent_possible(max_count, total) {
        reelscout_core::log_event::warn(
            Some("shuffle"),
            &format!("owner imbalance ({max_count}/{total}) makes a fully run-free shuffle impossible; minimizing runs instead"),
        );
    }

    let mut result = Vec::with_capacity(total);
    let mut last_key: Option<Option<String>> = None;
    while result.len() < total {
        let mut keys: Vec<Option<String>> = buckets
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort_by_key(|k| std::cmp::Reverse(buckets[k].len()));

        let chosen = keys
            .iter()
            .find(|k| Some((*k).clone()) != last_key)
            .or_else(|| keys.first())
            .cloned();

        let Some(key) = chosen else { break };
        if let Some(bucket) = buckets.get_mut(&key) {
            if let Some(row) = bucket.pop() {
                result.push(row);
                last_key = Some(key);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reel(url: &str, owner: Option<&str>) -> Reel {
        let mut r = Reel::discovered(url, "kw", Utc::now());
        r.owner_handle = owner.map(str::to_string);
        r
    }

    #[test]
    fn avoids_adjacent_same_owner_when_possible() {
        let rows = vec![
            reel("u1", Some("a")),
            reel("u2", Some("a")),
            reel("u3", Some("b")),
            reel("u4", Some("b")),
        ];
        let shuffled = shuffle_no_adjacent_owner(rows, 42);
        for window in shuffled.windows(2) {
            assert_ne!(window[0].owner_handle, window[1].owner_handle);
        }
    }

    #[test]
    fn is_deterministic_for_a_fixed_seed() {
        let rows = || {
            vec![
                reel("u1", Some("a")),
                reel("u2", Some("b")),
                reel("u3", Some("c")),
            ]
        };
        let first: Vec<String> = shuffle_no_adjacent_owner(rows(), 7).into_iter().map(|r| r.url).collect();
        let second: Vec<String> = shuffle_no_adjacent_owner(rows(), 7).into_iter().map(|r| r.url).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn no_adjacent_possible_matches_the_combinatorial_rule() {
        assert!(no_adjacent_possible(3, 5));
        assert!(!no_adjacent_possible(4, 5));
    }

    #[test]
    fn preserves_all_rows() {
        let rows = vec![reel("u1", Some("a")), reel("u2", None), reel("u3", Some("a"))];
        let shuffled = shuffle_no_adjacent_owner(rows, 1);
        assert_eq!(shuffled.len(), 3);
    }
}
