//! Session analyzer (spec §4.4.3): summary statistics over a session log,
//! consumed by the smart-context builder and the terminal `final` log event.

use reelscout_core::model::{Reel, Status, UsDecision};
use serde::Serialize;
use std::collections::HashSet;

/// Breakdown of rows by [`UsDecision`].
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct UsCounts {
    /// Rows decided `US`.
    pub us: usize,
    /// Rows decided `non-US`.
    pub non_us: usize,
    /// Rows not yet classified.
    pub unknown: usize,
}

/// Summary statistics over a session's rows.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionStats {
    /// Total distinct rows (discovered or further along).
    pub total_rows: usize,
    /// Rows with post metadata hydrated (`status` at least `hydrated`).
    pub hydrated: usize,
    /// Rows carrying a non-empty transcript.
    pub with_transcripts: usize,
    /// US-classification breakdown.
    pub us_counts: UsCounts,
    /// Rows with `status == accepted`.
    pub accepted_count: usize,
    /// Distinct `owner_handle` values across all rows.
    pub unique_owners: usize,
}

/// Compute [`SessionStats`] over the given rows.
#[must_use]
pub fn analyze(rows: &[Reel]) -> SessionStats {
    let mut hydrated = 0;
    let mut with_transcripts = 0;
    let mut us_counts = UsCounts::default();
    let mut accepted_count = 0;
    let mut owners: HashSet<&str> = HashSet::new();

    for row in rows {
        if matches!(
            row.status,
            Status::Hydrated | Status::Analyzed | Status::Accepted | Status::Rejected
        ) {
            hydrated += 1;
        }
        if row.transcript.as_deref().is_some_and(|t| !t.is_empty()) {
            with_transcripts += 1;
        }
        match row.us_decision {
            UsDecision::Us => us_counts.us += 1,
            UsDecision::NonUs => us_counts.non_us += 1,
            UsDecision::Unknown => us_counts.unknown += 1,
        }
        if row.status == Status::Accepted {
            accepted_count += 1;
        }
        if let Some(handle) = row.owner_handle.as_deref() {
            owners.insert(handle);
        }
    }

    SessionStats {
        total_rows: rows.len(),
        hydrated,
        with_transcripts,
        us_counts,
        accepted_count,
        unique_owners: owners.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn counts_across_a_mixed_session() {
        let now = Utc::now();
        let mut a = Reel::discovered("https://www.instagram.com/reel/A", "kw", now);
        a.status = Status::Hydrated;
        a.owner_handle = Some("owner1".to_string());
        a.transcript = Some("hello".to_string());
        a.us_decision = UsDecision::Us;

        let mut b = Reel::discovered("https://www.instagram.com/reel/B", "kw", now);
        b.status = Status::Accepted;
        b.owner_handle = Some("owner1".to_string());
        b.us_decision = UsDecision::Us;

        let c = Reel::discovered("https://www.instagram.com/reel/C", "kw", now);

        let stats = analyze(&[a, b, c]);
        assert_eq!(stats.total_rows, 3);
        assert_eq!(stats.hydrated, 2);
        assert_eq!(stats.with_transcripts, 1);
        assert_eq!(stats.us_counts, UsCounts { us: 2, non_us: 0, unknown: 1 });
        assert_eq!(stats.accepted_count, 1);
        assert_eq!(stats.unique_owners, 1);
    }
}
