//! `build_transcript_context` (spec §4.5.2).

use crate::keyword::contains_keyword;
use crate::quality::{percentage, quality_score, QualityScore};
use reelscout_providers::TranscriptResult;
use serde::Serialize;

const SAMPLE_MAX: usize = 5;

/// Qualitative keyword relevance tier for a transcript batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    /// Match-rate ≥50%.
    High,
    /// Match-rate ≥20%.
    Medium,
    /// Below the `Medium` threshold.
    Low,
}

/// Keyword match summary within transcripts.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptKeywordAnalysis {
    /// Number of transcripts containing the keyword.
    pub matches: usize,
    /// `matches / with_text` as a percentage string.
    pub match_rate: String,
    /// Qualitative tier derived from `match_rate`.
    pub relevance: Relevance,
}

/// One representative transcript sample, truncated for the LLM.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptSample {
    /// The URL this transcript belongs to.
    pub url: String,
    /// Transcript text truncated to `max_chars`, with an ellipsis marker if
    /// truncated.
    pub transcript: String,
}

/// Compact summary of a transcript-hydration batch.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptContext {
    /// Number of URLs requested.
    pub total: usize,
    /// Number with non-empty transcript text.
    pub with_text: usize,
    /// `with_text / total` as a percentage string.
    pub success_rate: String,
    /// Overall quality verdict.
    pub quality_score: QualityScore,
    /// Keyword match summary.
    pub keyword_analysis: TranscriptKeywordAnalysis,
    /// 3-5 representative samples.
    pub samples: Vec<TranscriptSample>,
    /// Short imperative recommendation driven by `quality_score`.
    pub recommendation: String,
}

fn recommendation_for(score: QualityScore) -> &'static str {
    match score {
        QualityScore::Excellent => "Transcripts strongly confirm relevance; proceed toward finalize.",
        QualityScore::Good => "Transcripts are reasonably on-topic; a few more samples would help.",
        QualityScore::Fair => "Transcript signal is weak; lean on captions and profiles instead.",
        QualityScore::Poor => "Transcripts add little signal here; consider skipping further fetches.",
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}…")
    }
}

/// Build a [`TranscriptContext`] from a batch of transcript results
/// (spec §4.5.2). `max_chars` bounds each sample's transcript text
/// (`MAX_TRANSCRIPT_CHARS`).
#[must_use]
pub fn build_transcript_context(
    transcripts: &[TranscriptResult],
    keyword: &str,
    max_chars: usize,
) -> TranscriptContext {
    let total = transcripts.len();
    let with_text: Vec<&TranscriptResult> = transcripts
        .iter()
        .filter(|t| t.transcript.as_deref().is_some_and(|s| !s.is_empty()))
        .collect();

    let matches = with_text
        .iter()
        .filter(|t| contains_keyword(t.transcript.as_deref().unwrap_or(""), keyword))
        .count();
    let match_rate_pct = if with_text.is_empty() {
        0.0
    } else {
        (matches as f64 / with_text.len() as f64) * 100.0
    };
    let relevance = if match_rate_pct >= 50.0 {
        Relevance::High
    } else if match_rate_pct >= 20.0 {
        Relevance::Medium
    } else {
        Relevance::Low
    };

    let success_rate_pct = (with_text.len() as f64 / total.max(1) as f64) * 100.0;
    let quality = quality_score(success_rate_pct, match_rate_pct);

    let samples = with_text
        .iter()
        .take(with_text.len().min(SAMPLE_MAX))
        .map(|t| TranscriptSample {
            url: t.url.clone(),
            transcript: truncate(t.transcript.as_deref().unwrap_or(""), max_chars),
        })
        .collect();

    TranscriptContext {
        total,
        with_text: with_text.len(),
        success_rate: percentage(with_text.len(), total),
        quality_score: quality,
        keyword_analysis: TranscriptKeywordAnalysis {
            matches,
            match_rate: percentage(matches, with_text.len()),
            relevance,
        },
        samples,
        recommendation: recommendation_for(quality).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(url: &str, transcript: Option<&str>) -> TranscriptResult {
        TranscriptResult {
            url: url.to_string(),
            transcript: transcript.map(str::to_string),
        }
    }

    #[test]
    fn summarizes_keyword_matches() {
        let data = vec![
            result("u1", Some("talking about airpods pro here")),
            result("u2", Some("totally unrelated content")),
            result("u3", None),
        ];
        let ctx = build_transcript_context(&data, "airpods pro", 500);
        assert_eq!(ctx.total, 3);
        assert_eq!(ctx.with_text, 2);
        assert_eq!(ctx.keyword_analysis.matches, 1);
    }

    #[test]
    fn truncates_long_transcripts_with_ellipsis() {
        let long = "a".repeat(1000);
        let data = vec![result("u1", Some(&long))];
        let ctx = build_transcript_context(&data, "kw", 50);
        assert!(ctx.samples[0].transcript.ends_with('…'));
        assert_eq!(ctx.samples[0].transcript.chars().count(), 51);
    }

    #[test]
    fn empty_batch_does_not_panic() {
        let ctx = build_transcript_context(&[], "kw", 500);
        assert_eq!(ctx.with_text, 0);
        assert_eq!(ctx.success_rate, "0.0%");
    }
}
