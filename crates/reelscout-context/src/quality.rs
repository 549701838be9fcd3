//! Shared coverage/match-rate quality banding used by all three context
//! builders (spec §4.5).

use serde::Serialize;

/// Qualitative verdict on how much signal a provider batch carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityScore {
    /// Coverage ≥80% and match-rate ≥50%.
    Excellent,
    /// Coverage ≥60% and match-rate ≥30%.
    Good,
    /// Coverage ≥30% and match-rate ≥10%.
    Fair,
    /// Below the `Fair` thresholds.
    Poor,
}

impl std::fmt::Display for QualityScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        };
        f.write_str(s)
    }
}

/// Derive a [`QualityScore`] from a coverage percentage (e.g. caption or
/// transcript-success coverage) and a keyword match-rate percentage
/// (spec §4.5.1).
#[must_use]
pub fn quality_score(coverage_pct: f64, match_rate_pct: f64) -> QualityScore {
    if coverage_pct >= 80.0 && match_rate_pct >= 50.0 {
        QualityScore::Excellent
    } else if coverage_pct >= 60.0 && match_rate_pct >= 30.0 {
        QualityScore::Good
    } else if coverage_pct >= 30.0 && match_rate_pct >= 10.0 {
        QualityScore::Fair
    } else {
        QualityScore::Poor
    }
}

/// Format a ratio as a one-decimal percentage string, `"0.0%"` when `total`
/// is zero.
#[must_use]
pub fn percentage(count: usize, total: usize) -> String {
    if total == 0 {
        "0.0%".to_string()
    } else {
        format!("{:.1}%", (count as f64 / total as f64) * 100.0)
    }
}
