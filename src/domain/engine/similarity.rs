//! Word-set similarity used for anti-repetition checks.

use std::collections::HashSet;

use crate::domain::text::normalized_words;

fn word_set(text: &str) -> HashSet<String> {
    normalized_words(text).into_iter().collect()
}

/// Jaccard similarity of the normalized word sets, in `0.0..=1.0`.
///
/// Two empty texts are identical.
pub fn jaccard(a: &str, b: &str) -> f64 {
    let a = word_set(a);
    let b = word_set(b);
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let shared = a.intersection(&b).count();
    let total = a.union(&b).count();
    shared as f64 / total as f64
}

/// Highest similarity between `candidate` and any of `others`.
pub fn max_similarity<'a, I>(candidate: &str, others: I) -> f64
where
    I: IntoIterator<Item = &'a str>,
{
    others
        .into_iter()
        .map(|other| jaccard(candidate, other))
        .fold(0.0, f64::max)
}
