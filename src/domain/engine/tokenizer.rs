//! List tokenizer for deterministic gates.
//!
//! Commas, semicolons, slashes, newlines and plain whitespace all separate
//! values. Splitting on commas alone under-counts space-separated entries
//! such as "תסכול יאוש".

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::domain::text::trim_punctuation;

/// Connectives and fillers that are never list entries on their own.
static FILLERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "and", "or", "also", "too", "i", "i'm", "im", "me", "my", "a", "an", "the", "of", "was",
        "were", "is", "am", "felt", "feel", "feeling", "some", "very", "really", "quite", "bit",
        "little", "kind", "sort", "like", "maybe", "just", "with", "then", "plus", "etc",
        "ו", "גם", "וגם", "או", "אני", "הרגשתי", "מרגיש", "מרגישה", "הרגשה", "קצת", "מאוד",
        "ממש", "הרבה", "של", "עם", "כמו", "היה", "הייתה", "הייתי", "זה", "אולי", "פשוט", "וכו",
    ]
    .into_iter()
    .collect()
});

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | ';' | '/' | '|' | '،' | '、' | '·' | '•')
}

/// Splits an utterance into candidate list entries, in order of appearance.
///
/// Entries keep their original casing; duplicates are left for the
/// accumulator to collapse.
pub fn split_list(utterance: &str) -> Vec<String> {
    utterance
        .split(is_separator)
        .map(trim_punctuation)
        .filter(|token| !token.is_empty())
        .filter(|token| !is_filler(token))
        .map(str::to_string)
        .collect()
}

pub fn is_filler(token: &str) -> bool {
    FILLERS.contains(token.to_lowercase().as_str())
}

/// First integer found in the utterance and the words left around it.
pub fn split_score(utterance: &str) -> Option<(i64, String)> {
    let mut score = None;
    let mut rest = Vec::new();
    for raw in utterance.split(|c: char| c.is_whitespace() || c == ',') {
        let word = trim_punctuation(raw);
        if word.is_empty() {
            continue;
        }
        if score.is_none() {
            // "7/10" carries its scale along.
            let number = word.split_once('/').map_or(word, |(n, _)| n);
            if let Ok(value) = number.parse::<i64>() {
                score = Some(value);
                continue;
            }
        }
        rest.push(word);
    }
    score.map(|value| (value, rest.join(" ")))
}
