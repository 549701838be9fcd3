//! The on-disk row shape: a fixed, ordered set of known columns plus
//! conversions to and from [`Reel`]. Rows are represented as
//! [`BTreeMap<String, String>`] rather than a fixed struct so unrecognized
//! columns (widened by a future build) survive a read-modify-write cycle
//! untouched.

use chrono::{DateTime, Utc};
use reelscout_core::model::{Reel, RelevanceDecision, Status, UsDecision};
use std::collections::BTreeMap;
use std::str::FromStr;

/// One CSV row, keyed by column name. Values are the literal cell text;
/// absence of a key means "column not yet seen for this row", not
/// necessarily null (an empty string is the null marker for known columns).
pub type Row = BTreeMap<String, String>;

/// The columns this build knows how to interpret, in canonical order. A
/// file's actual header may carry additional columns (from a newer build);
/// those are preserved but opaque to [`row_to_reel`].
pub const KNOWN_COLUMNS: &[&str] = &[
    "url",
    "shortcode",
    "keyword",
    "caption",
    "owner_handle",
    "owner_name",
    "is_verified",
    "is_video",
    "product_type",
    "views",
    "taken_at_iso",
    "thumbnail",
    "location_name",
    "transcript",
    "us_decision",
    "us_reason",
    "relevance_decision",
    "status",
    "row_created_at",
    "row_updated_at",
];

fn opt_string(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn opt_bool(value: Option<bool>) -> String {
    value.map(|b| b.to_string()).unwrap_or_default()
}

fn opt_u64(value: Option<u64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}

/// Flatten a [`Reel`] into its canonical row representation.
#[must_use]
pub fn reel_to_row(reel: &Reel) -> Row {
    let mut row = Row::new();
    row.insert("url".into(), reel.url.clone());
    row.insert("shortcode".into(), reel.shortcode.clone());
    row.insert("keyword".into(), reel.keyword.clone());
    row.insert("caption".into(), reel.caption.clone());
    row.insert("owner_handle".into(), opt_string(&reel.owner_handle));
    row.insert("owner_name".into(), opt_string(&reel.owner_name));
    row.insert("is_verified".into(), opt_bool(reel.is_verified));
    row.insert("is_video".into(), opt_bool(reel.is_video));
    row.insert("product_type".into(), opt_string(&reel.product_type));
    row.insert("views".into(), opt_u64(reel.views));
    row.insert("taken_at_iso".into(), opt_string(&reel.taken_at_iso));
    row.insert("thumbnail".into(), opt_string(&reel.thumbnail));
    row.insert("location_name".into(), opt_string(&reel.location_name));
    row.insert("transcript".into(), opt_string(&reel.transcript));
    row.insert("us_decision".into(), reel.us_decision.to_string());
    row.insert("us_reason".into(), reel.us_reason.clone());
    row.insert(
        "relevance_decision".into(),
        reel.relevance_decision.to_string(),
    );
    row.insert("status".into(), reel.status.to_string());
    row.insert("row_created_at".into(), reel.row_created_at.to_rfc3339());
    row.insert("row_updated_at".into(), reel.row_updated_at.to_rfc3339());
    row
}

fn cell<'a>(row: &'a Row, key: &str) -> &'a str {
    row.get(key).map(String::as_str).unwrap_or("")
}

fn non_empty(row: &Row, key: &str) -> Option<String> {
    let v = cell(row, key);
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}

/// Reconstruct a [`Reel`] from a row. Missing columns degrade to the same
/// defaults [`Reel::discovered`] would use; a missing/unparseable timestamp
/// falls back to `now`.
#[must_use]
pub fn row_to_reel(row: &Row, now: DateTime<Utc>) -> Reel {
    let created = non_empty(row, "row_created_at")
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now);
    let updated = non_empty(row, "row_updated_at")
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(created);

    Reel {
        url: cell(row, "url").to_string(),
        shortcode: cell(row, "shortcode").to_string(),
        keyword: cell(row, "keyword").to_string(),
        caption: cell(row, "caption").to_string(),
        owner_handle: non_empty(row, "owner_handle"),
        owner_name: non_empty(row, "owner_name"),
        is_verified: cell(row, "is_verified").parse().ok(),
        is_video: cell(row, "is_video").parse().ok(),
        product_type: non_empty(row, "product_type"),
        views: cell(row, "views").parse().ok(),
        taken_at_iso: non_empty(row, "taken_at_iso"),
        thumbnail: non_empty(row, "thumbnail"),
        location_name: non_empty(row, "location_name"),
        transcript: non_empty(row, "transcript"),
        us_decision: UsDecision::from_str(cell(row, "us_decision")).unwrap_or_default(),
        us_reason: cell(row, "us_reason").to_string(),
        relevance_decision: RelevanceDecision::from_str(cell(row, "relevance_decision"))
            .unwrap_or_default(),
        status: Status::from_str(cell(row, "status")).unwrap_or_default(),
        row_created_at: created,
        row_updated_at: updated,
    }
}
