//! Small text helpers shared by the gate, guard and composer.
//!
//! Matching is case-insensitive and respects word boundaries, so a phrase
//! like "done" does not fire inside "abandoned" and "זהו" does not fire
//! inside "זהות".

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Lowercased word tokens with surrounding punctuation removed.
pub fn normalized_words(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .map(trim_punctuation)
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Trims punctuation and quotes from both ends, keeping inner characters
/// such as apostrophes and Hebrew gershayim.
pub fn trim_punctuation(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric())
}

fn chars_eq_ci(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Finds `phrase` in `text`, returning the byte range of the match.
pub fn find_phrase(text: &str, phrase: &str) -> Option<(usize, usize)> {
    let phrase = phrase.trim();
    if phrase.is_empty() {
        return None;
    }
    let needs_start_boundary = phrase.chars().next().is_some_and(is_word_char);
    let needs_end_boundary = phrase.chars().last().is_some_and(is_word_char);

    for (start, _) in text.char_indices() {
        if needs_start_boundary {
            if let Some(prev) = text[..start].chars().next_back() {
                if is_word_char(prev) {
                    continue;
                }
            }
        }

        let mut hay = text[start..].char_indices();
        let mut matched = true;
        let mut end = start;
        for p in phrase.chars() {
            match hay.next() {
                Some((offset, h)) if chars_eq_ci(h, p) => end = start + offset + h.len_utf8(),
                _ => {
                    matched = false;
                    break;
                }
            }
        }
        if !matched {
            continue;
        }
        if needs_end_boundary {
            if let Some(next) = text[end..].chars().next() {
                if is_word_char(next) {
                    continue;
                }
            }
        }
        return Some((start, end));
    }
    None
}

pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    find_phrase(text, phrase).is_some()
}

pub fn contains_any<S: AsRef<str>>(text: &str, phrases: &[S]) -> bool {
    phrases.iter().any(|p| contains_phrase(text, p.as_ref()))
}

/// Removes every occurrence of every phrase, leaving the rest of the text.
pub fn strip_phrases<S: AsRef<str>>(text: &str, phrases: &[S]) -> String {
    let mut out = text.to_string();
    for phrase in phrases {
        while let Some((start, end)) = find_phrase(&out, phrase.as_ref()) {
            out.replace_range(start..end, " ");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_words() {
        assert_eq!(word_count("  one two\nthree "), 3);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn normalizes_words() {
        assert_eq!(
            normalized_words("Anger, \"Shame\"; fear!"),
            vec!["anger", "shame", "fear"]
        );
    }

    #[test]
    fn phrase_match_is_case_insensitive() {
        assert!(contains_phrase("I'm DONE here", "i'm done"));
    }

    #[test]
    fn phrase_match_respects_word_boundaries() {
        assert!(!contains_phrase("I abandoned it", "done"));
        assert!(!contains_phrase("זהות", "זהו"));
        assert!(contains_phrase("כעס, זהו.", "זהו"));
    }

    #[test]
    fn punctuation_phrases_match_anywhere() {
        assert!(contains_phrase("when?", "when?"));
        assert!(contains_phrase("but when? really", "when?"));
    }

    #[test]
    fn strips_phrases() {
        let stripped = strip_phrases("anger, shame, that's all", &["that's all"]);
        assert_eq!(stripped.trim().trim_end_matches(','), "anger, shame");
    }

    #[test]
    fn finds_byte_range_for_multibyte_text() {
        let (start, end) = find_phrase("אני לא הבנתי", "לא הבנתי").unwrap();
        assert_eq!(&"אני לא הבנתי"[start..end], "לא הבנתי");
    }
}
