//! Post-processing pipeline (spec §4.8): US filter, per-creator cap,
//! deterministic no-adjacent-owner shuffle, and final slice to
//! `MAX_RESULTS`, composed in [`pipeline::run`].

pub mod pipeline;
pub mod shuffle;
pub mod steps;

pub use pipeline::{run, PostProcessConfig, PostProcessOutcome};
pub use shuffle::{no_adjacent_possible, seed_from_session_id, shuffle_no_adjacent_owner};
pub use steps::{per_creator_cap, slice_to_max_results, us_filter};

#[cfg(test)]
mod property_tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use reelscout_core::model::Reel;

    fn reel_with_owner(i: usize, owner: Option<String>) -> Reel {
        let mut r = Reel::discovered(format!("https://www.instagram.com/reel/R{i}"), "kw", Utc::now());
        r.owner_handle = owner;
        r
    }

    proptest! {
        #[test]
        fn shuffle_avoids_adjacency_whenever_combinatorially_possible(
            owner_counts in prop::collection::vec(1usize..6, 2..8),
            seed in any::<u64>(),
        ) {
            let total: usize = owner_counts.iter().sum();
            let max_count = *owner_counts.iter().max().unwrap();
            prop_assume!(no_adjacent_possible(max_count, total));

            let mut rows = Vec::new();
            let mut i = 0;
            for (owner_idx, count) in owner_counts.iter().enumerate() {
                for _ in 0..*count {
                    rows.push(reel_with_owner(i, Some(format!("owner{owner_idx}"))));
                    i += 1;
                }
            }

            let shuffled = shuffle_no_adjacent_owner(rows, seed);
            for window in shuffled.windows(2) {
                prop_assert_ne!(&window[0].owner_handle, &window[1].owner_handle);
            }
        }

        #[test]
        fn per_creator_cap_never_exceeds_cap_per_owner(
            owners in prop::collection::vec(0usize..4, 1..20),
            cap in 1usize..5,
        ) {
            let rows: Vec<Reel> = owners
                .iter()
                .enumerate()
                .map(|(i, owner)| reel_with_owner(i, Some(format!("owner{owner}"))))
                .collect();
            let capped = per_creator_cap(rows, cap);
            let mut counts = std::collections::HashMap::new();
            for row in &capped {
                *counts.entry(row.owner_handle.clone()).or_insert(0) += 1;
            }
            for count in counts.values() {
                prop_assert!(*count <= cap);
            }
        }
    }
}
