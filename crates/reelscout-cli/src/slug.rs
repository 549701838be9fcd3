//! Turns a free-text keyword into the filesystem- and log-safe token half
//! of a session id (spec §3: `session_id = {slug(keyword)}_{timestamp}`).

/// Lowercase the keyword, collapse runs of anything outside `[a-z0-9]` into
/// a single underscore, and trim leading/trailing underscores.
#[must_use]
pub fn slug(keyword: &str) -> String {
    let mut out = String::with_capacity(keyword.len());
    let mut last_was_sep = false;
    for ch in keyword.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_was_sep = false;
        } else if !last_was_sep && !out.is_empty() {
            out.push('_');
            last_was_sep = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("keyword");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_and_punctuation() {
        assert_eq!(slug("Coffee Shops!"), "coffee_shops");
    }

    #[test]
    fn trims_trailing_separators() {
        assert_eq!(slug("  trailing  "), "trailing");
    }

    #[test]
    fn empty_input_falls_back_to_a_placeholder() {
        assert_eq!(slug("   "), "keyword");
    }
}
