//! Case-insensitive keyword matching shared by the post and transcript
//! context builders (spec §4.5.1, §4.5.2).

/// Relevance hint derived from a single text field's match against the
/// search keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelevanceHint {
    /// The full keyword phrase appears in the text.
    Strong,
    /// At least one keyword word appears, but not the full phrase.
    Weak,
    /// No keyword word appears at all.
    None,
}

impl std::fmt::Display for RelevanceHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Strong => "strong",
            Self::Weak => "weak",
            Self::None => "none",
        };
        f.write_str(s)
    }
}

/// Whether `text` contains the full `keyword` phrase, case-insensitively.
#[must_use]
pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    !keyword.trim().is_empty() && text.to_lowercase().contains(&keyword.to_lowercase())
}

/// Derive a [`RelevanceHint`] for one text field against the keyword.
#[must_use]
pub fn relevance_hint(text: &str, keyword: &str) -> RelevanceHint {
    let lower_text = text.to_lowercase();
    if contains_keyword(text, keyword) {
        return RelevanceHint::Strong;
    }
    let any_word = keyword
        .split_whitespace()
        .any(|word| !word.is_empty() && lower_text.contains(&word.to_lowercase()));
    if any_word {
        RelevanceHint::Weak
    } else {
        RelevanceHint::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_phrase_is_strong() {
        assert_eq!(
            relevance_hint("best airpods pro review", "airpods pro"),
            RelevanceHint::Strong
        );
    }

    #[test]
    fn partial_word_is_weak() {
        assert_eq!(relevance_hint("my new airpods", "airpods pro"), RelevanceHint::Weak);
    }

    #[test]
    fn no_overlap_is_none() {
        assert_eq!(relevance_hint("unrelated caption", "airpods pro"), RelevanceHint::None);
    }
}
