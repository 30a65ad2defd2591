//! Text normalization helpers shared by job specs, snippets, and exports.

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_inline_whitespace<T: AsRef<str>>(text: T) -> String {
    let mut normalized = String::new();
    let mut seen_space = false;
    for ch in text.as_ref().chars() {
        if ch.is_whitespace() {
            if !seen_space {
                normalized.push(' ');
                seen_space = true;
            }
        } else {
            normalized.push(ch);
            seen_space = false;
        }
    }
    normalized.trim().to_string()
}

/// Lower-cased word tokens made of ASCII letters and apostrophes.
pub fn word_tokens(text: &str) -> Vec<String> {
    text.split(|ch: char| !(ch.is_ascii_alphabetic() || ch == '\''))
        .filter(|token| !token.is_empty())
        .map(|token| token.to_ascii_lowercase())
        .collect()
}

/// Shorten `text` to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_inline_whitespace_collapses_runs() {
        let input = "Alpha\n\n  Beta\tGamma";
        assert_eq!(normalize_inline_whitespace(input), "Alpha Beta Gamma");
        assert_eq!(normalize_inline_whitespace("   "), "");
    }

    #[test]
    fn word_tokens_split_on_non_letters() {
        assert_eq!(
            word_tokens("Don't panic: GROWTH-risk 2025!"),
            vec!["don't", "panic", "growth", "risk"]
        );
        assert!(word_tokens("1234 ...").is_empty());
    }

    #[test]
    fn truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdefghij", 6), "abc...");
        assert_eq!(truncate_chars("ééééééé", 5), "éé...");
    }
}
