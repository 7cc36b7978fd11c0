use std::collections::HashSet;
use std::sync::OnceLock;

use unicode_general_category::{get_general_category, GeneralCategory};
use unicode_normalization::UnicodeNormalization;

/// Every code point whose general category is one of the `P*` classes.
///
/// Built once on first use by scanning the whole Unicode range.
fn punctuation_table() -> &'static HashSet<char> {
    static TABLE: OnceLock<HashSet<char>> = OnceLock::new();
    TABLE.get_or_init(|| {
        (0..=char::MAX as u32)
            .filter_map(char::from_u32)
            .filter(|c| is_punctuation_category(get_general_category(*c)))
            .collect()
    })
}

fn is_punctuation_category(category: GeneralCategory) -> bool {
    matches!(
        category,
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
    )
}

/// Canonical form used for both stored segment text and live queries.
///
/// NFC composition, lowercase, hyphen and em-dash become word breaks,
/// punctuation is dropped, and whitespace runs collapse to one space.
pub fn normalize(text: &str) -> String {
    let composed: String = text.nfc().collect::<String>().to_lowercase();
    let table = punctuation_table();
    let stripped: String = composed
        .chars()
        .map(|c| if c == '-' || c == '\u{2014}' { ' ' } else { c })
        .filter(|c| !table.contains(c))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps only the trailing `window` tokens of already-normalized text.
pub fn last_tokens(normalized: &str, window: usize) -> String {
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    let start = tokens.len().saturating_sub(window);
    tokens[start..].join(" ")
}

pub fn token_count(normalized: &str) -> usize {
    normalized.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_case_and_punctuation_insensitive() {
        assert_eq!(normalize("Hello, World!"), normalize("hello world"));
        assert_eq!(normalize("Hello, World!"), "hello world");
    }

    #[rstest]
    #[case::hyphen("well-known fact", "well known fact")]
    #[case::em_dash("wait\u{2014}what", "wait what")]
    #[case::curly_quotes("they don\u{2019}t", "they dont")]
    #[case::whitespace_runs("  a \t b\n\nc  ", "a b c")]
    #[case::inverted_marks("\u{00bf}Qu\u{00e9}?", "qu\u{00e9}")]
    #[case::empty("", "")]
    #[case::only_punctuation("...!?", "")]
    fn test_normalize_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn test_decomposed_input_is_composed() {
        // "e" + combining acute accent
        assert_eq!(normalize("Caf\u{0065}\u{0301}"), "caf\u{00e9}");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = ["Hello, World!", "It's \u{2014} a  well-known: fact.", "\u{00bf}Qu\u{00e9}?"];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_symbols_are_kept() {
        // `+` and `$` are symbols, not punctuation
        assert_eq!(normalize("1 + 1 = $2"), "1 + 1 = $2");
    }

    #[test]
    fn test_last_tokens_keeps_tail() {
        assert_eq!(last_tokens("a b c d e f g h i", 7), "c d e f g h i");
        assert_eq!(last_tokens("a b", 7), "a b");
        assert_eq!(last_tokens("", 7), "");
    }

    #[test]
    fn test_token_count() {
        assert_eq!(token_count("one two three"), 3);
        assert_eq!(token_count(""), 0);
    }
}
