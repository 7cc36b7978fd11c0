use crate::matching::domain::phonetic_encoder::PhoneticEncoder;

/// Metaphone-style pronunciation keys for English text.
///
/// Each word is encoded separately and the codes are concatenated without
/// separators. Non-ASCII letters, digits and punctuation carry no sound here
/// and are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetaphoneEncoder;

impl MetaphoneEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl PhoneticEncoder for MetaphoneEncoder {
    fn encode(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|word| {
                let letters: Vec<u8> = word
                    .bytes()
                    .filter(u8::is_ascii_alphabetic)
                    .map(|b| b.to_ascii_uppercase())
                    .collect();
                encode_word(letters)
            })
            .collect()
    }
}

fn is_vowel(c: Option<u8>) -> bool {
    matches!(c, Some(b'A' | b'E' | b'I' | b'O' | b'U'))
}

fn is_front_vowel(c: Option<u8>) -> bool {
    matches!(c, Some(b'E' | b'I' | b'Y'))
}

fn encode_word(mut w: Vec<u8>) -> String {
    if w.is_empty() {
        return String::new();
    }

    let mut start = 0;
    match (w[0], w.get(1).copied()) {
        (b'A', Some(b'E'))
        | (b'G', Some(b'N'))
        | (b'K', Some(b'N'))
        | (b'P', Some(b'N'))
        | (b'W', Some(b'R')) => start = 1,
        (b'W', Some(b'H')) => {
            w.remove(1);
        }
        (b'X', _) => w[0] = b'S',
        _ => {}
    }

    let w = w;
    let len = w.len();
    let at = |i: usize| w.get(i).copied();
    let mut code = String::with_capacity(len);

    for i in start..len {
        let c = w[i];
        let prev = if i > 0 { Some(w[i - 1]) } else { None };
        let next = at(i + 1);
        let next2 = at(i + 2);

        if i > start && prev == Some(c) && c != b'C' {
            continue;
        }

        match c {
            b'A' | b'E' | b'I' | b'O' | b'U' => {
                if i == start {
                    code.push(c as char);
                }
            }
            b'B' => {
                if !(i + 1 == len && prev == Some(b'M')) {
                    code.push('B');
                }
            }
            b'C' => {
                if next == Some(b'I') && next2 == Some(b'A') {
                    code.push('X');
                } else if next == Some(b'H') {
                    code.push(if prev == Some(b'S') { 'K' } else { 'X' });
                } else if is_front_vowel(next) {
                    if prev != Some(b'S') {
                        code.push('S');
                    }
                } else {
                    code.push('K');
                }
            }
            b'D' => {
                if next == Some(b'G') && is_front_vowel(next2) {
                    code.push('J');
                } else {
                    code.push('T');
                }
            }
            b'G' => {
                let silent_gh = next == Some(b'H') && !(i + 2 == len || is_vowel(next2));
                let silent_gn = next == Some(b'N')
                    && (i + 2 == len
                        || (next2 == Some(b'E') && at(i + 3) == Some(b'D') && i + 4 == len));
                if (prev == Some(b'D') && is_front_vowel(next)) || silent_gh || silent_gn {
                    // silent
                } else if is_front_vowel(next) && prev != Some(b'G') {
                    code.push('J');
                } else {
                    code.push('K');
                }
            }
            b'H' => {
                let after_modifier = matches!(prev, Some(b'C' | b'S' | b'P' | b'T' | b'G'));
                let between_vowel_and_consonant = is_vowel(prev) && !is_vowel(next);
                if !after_modifier && !between_vowel_and_consonant {
                    code.push('H');
                }
            }
            b'K' => {
                if prev != Some(b'C') {
                    code.push('K');
                }
            }
            b'P' => code.push(if next == Some(b'H') { 'F' } else { 'P' }),
            b'Q' => code.push('K'),
            b'S' => {
                if next == Some(b'H')
                    || (next == Some(b'I') && matches!(next2, Some(b'O' | b'A')))
                {
                    code.push('X');
                } else {
                    code.push('S');
                }
            }
            b'T' => {
                if next == Some(b'I') && matches!(next2, Some(b'O' | b'A')) {
                    code.push('X');
                } else if next == Some(b'H') {
                    code.push('0');
                } else if !(next == Some(b'C') && next2 == Some(b'H')) {
                    code.push('T');
                }
            }
            b'V' => code.push('F'),
            b'W' | b'Y' => {
                if is_vowel(next) {
                    code.push(c as char);
                }
            }
            b'X' => code.push_str("KS"),
            b'Z' => code.push('S'),
            other => code.push(other as char),
        }
    }

    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn encode(text: &str) -> String {
        MetaphoneEncoder::new().encode(text)
    }

    #[rstest]
    #[case::silent_k_and_gh("knight", "NT")]
    #[case::ph("phone", "FN")]
    #[case::sch("school", "SKL")]
    #[case::ch("cherry", "XR")]
    #[case::th("there", "0R")]
    #[case::initial_wr("write", "RT")]
    #[case::initial_x("xenon", "SNN")]
    #[case::trailing_mb("thumb", "0M")]
    #[case::dge("judge", "JJ")]
    #[case::tion("nation", "NXN")]
    #[case::x("box", "BKS")]
    #[case::initial_vowel("apple", "APL")]
    fn test_word_codes(#[case] word: &str, #[case] expected: &str) {
        assert_eq!(encode(word), expected);
    }

    #[test]
    fn test_homophones_share_codes() {
        assert_eq!(encode("their"), encode("there"));
        assert_eq!(encode("write"), encode("right"));
        assert_eq!(encode("knight"), encode("night"));
    }

    #[test]
    fn test_words_are_concatenated_without_spaces() {
        assert_eq!(encode("knight phone"), "NTFN");
    }

    #[test]
    fn test_case_and_punctuation_are_ignored() {
        assert_eq!(encode("It's"), encode("its"));
        assert_eq!(encode("PHONE"), encode("phone"));
    }

    #[test]
    fn test_empty_and_non_letters() {
        assert_eq!(encode(""), "");
        assert_eq!(encode("123 ..."), "");
    }
}
