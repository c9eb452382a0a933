//! Turning recognized text into filesystem-safe labels.

/// Fallback label when sanitization leaves nothing usable.
pub const FALLBACK_LABEL: &str = "subtitle";

/// Default maximum label length in characters.
pub const DEFAULT_MAX_LABEL_LENGTH: usize = 64;

/// Convert arbitrary recognized text into a safe, bounded-length label.
///
/// Steps, in order: strip characters illegal in filesystem paths
/// (`< > : " / \ | ? *`), collapse each whitespace run into a single
/// underscore, truncate to `max_length` characters, strip trailing `.`,
/// `_` and `-`. Never fails; an empty result falls back to
/// [`FALLBACK_LABEL`].
pub fn sanitize_label(text: &str, max_length: usize) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut in_whitespace = false;

    for c in text.chars() {
        if matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') {
            continue;
        }
        if c.is_whitespace() {
            if !in_whitespace {
                collapsed.push('_');
                in_whitespace = true;
            }
        } else {
            collapsed.push(c);
            in_whitespace = false;
        }
    }

    let truncated: String = collapsed.chars().take(max_length).collect();
    let stripped = truncated.trim_end_matches(['.', '_', '-']);

    if stripped.is_empty() {
        FALLBACK_LABEL.to_string()
    } else {
        stripped.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_falls_back() {
        assert_eq!(sanitize_label("", 64), FALLBACK_LABEL);
        assert_eq!(sanitize_label("   ", 64), FALLBACK_LABEL);
    }

    #[test]
    fn test_illegal_characters_stripped() {
        assert_eq!(sanitize_label("a/b:c", 64), "abc");
        assert_eq!(sanitize_label("<what?>", 64), "what");
        assert_eq!(sanitize_label("path\\to|file*", 64), "pathtofile");
    }

    #[test]
    fn test_whitespace_collapsed_to_underscore() {
        assert_eq!(sanitize_label("hello   world", 64), "hello_world");
        assert_eq!(sanitize_label("a\tb\nc", 64), "a_b_c");
    }

    #[test]
    fn test_truncation_counts_characters() {
        assert_eq!(sanitize_label("abcdefgh", 4), "abcd");
        // Multi-byte characters count as one each
        assert_eq!(sanitize_label("你好世界啊", 3), "你好世");
    }

    #[test]
    fn test_trailing_punctuation_stripped() {
        assert_eq!(sanitize_label("wait...", 64), "wait");
        assert_eq!(sanitize_label("dash-", 64), "dash");
        assert_eq!(sanitize_label("end _-.", 64), "end");
    }

    #[test]
    fn test_truncation_before_trailing_strip() {
        // Truncating can expose a trailing separator; it is stripped after
        assert_eq!(sanitize_label("ab \u{4F60}", 3), "ab");
    }

    #[test]
    fn test_only_illegal_characters_fall_back() {
        assert_eq!(sanitize_label("???///", 64), FALLBACK_LABEL);
        assert_eq!(sanitize_label("...", 64), FALLBACK_LABEL);
    }

    #[test]
    fn test_result_never_ends_in_separator() {
        for input in ["a.", "a_", "a-", "a.-_", "hello world "] {
            let label = sanitize_label(input, 64);
            assert!(!label.ends_with(['.', '_', '-']), "input {:?} -> {:?}", input, label);
        }
    }
}
