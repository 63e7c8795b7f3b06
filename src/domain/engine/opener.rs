//! Reflection opener policy.
//!
//! An opener echoes the human's words back before the system speaks. It is
//! generated by an external realizer, so every constraint is enforced here
//! after generation. A failing opener is suppressed, never repaired.

use thiserror::Error;

use crate::domain::session::RecentWindow;
use crate::domain::stage::OpenerFormat;
use crate::domain::text::{normalized_words, word_count};

use super::similarity::max_similarity;
use super::tokenizer::is_filler;

/// Phrases that editorialize instead of echoing.
pub const INTERPRETIVE_PHRASES: &[&str] = &[
    "it sounds like",
    "sounds like",
    "that must be",
    "that must have been",
    "this is a moment of",
    "it seems",
    "you seem",
    "i sense",
    "clearly you",
    "deep down",
    "what you really",
    "נשמע ש",
    "נשמע כמו",
    "זה בטח",
    "זה כנראה",
    "נראה ש",
    "נראה לי ש",
    "אני מרגיש שאתה",
    "זה רגע של",
];

/// Framing words allowed in an opener even though the human did not say them.
const FRAMING_WORDS: &[&str] = &[
    "i", "hear", "you", "said", "say", "your", "words", "so", "ok", "okay", "mentioned",
    "אני", "שומע", "שומעת", "אמרת", "ציינת", "כלומר",
];

const LIST_ECHO_PREFIX: &str = "I hear:";

/// Why an opener was suppressed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OpenerRejection {
    #[error("opener is empty")]
    Empty,

    #[error("opener has {words} words, limit is {max}")]
    TooLong { words: usize, max: usize },

    #[error("opener contains interpretive phrase '{0}'")]
    Interpretive(String),

    #[error("opener introduces '{0}', which the human did not say")]
    InventedContent(String),

    #[error("opener repeats a recent one (similarity {0:.2})")]
    Repetitive(f64),

    #[error("opener does not match the list echo format")]
    Malformed,
}

#[derive(Debug, Clone)]
pub struct OpenerPolicy {
    max_words: usize,
    similarity_threshold: f64,
    interpretive_phrases: Vec<String>,
}

impl OpenerPolicy {
    pub fn new(max_words: usize, similarity_threshold: f64, extra_phrases: &[String]) -> Self {
        let mut interpretive_phrases: Vec<String> =
            INTERPRETIVE_PHRASES.iter().map(|p| p.to_string()).collect();
        interpretive_phrases.extend(extra_phrases.iter().cloned());
        Self {
            max_words,
            similarity_threshold,
            interpretive_phrases,
        }
    }

    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// Checks a generated opener, returning it trimmed when acceptable.
    pub fn check(
        &self,
        opener: &str,
        utterance: &str,
        format: OpenerFormat,
        recent: &RecentWindow<String>,
    ) -> Result<String, OpenerRejection> {
        let opener = opener.trim();
        if opener.is_empty() {
            return Err(OpenerRejection::Empty);
        }

        let words = word_count(opener);
        if words > self.max_words {
            return Err(OpenerRejection::TooLong {
                words,
                max: self.max_words,
            });
        }

        if let Some(phrase) = self
            .interpretive_phrases
            .iter()
            .find(|p| interpretive_match(opener, p))
        {
            return Err(OpenerRejection::Interpretive(phrase.clone()));
        }

        let source = normalized_words(utterance);
        if let Some(invented) = normalized_words(opener)
            .into_iter()
            .filter(|w| !FRAMING_WORDS.contains(&w.as_str()) && !is_filler(w))
            .find(|w| !source.contains(w))
        {
            return Err(OpenerRejection::InventedContent(invented));
        }

        let similarity = max_similarity(opener, recent.iter().map(String::as_str));
        if similarity >= self.similarity_threshold {
            return Err(OpenerRejection::Repetitive(similarity));
        }

        if format == OpenerFormat::ListEcho && !is_list_echo(opener, &source) {
            return Err(OpenerRejection::Malformed);
        }

        Ok(opener.to_string())
    }
}

/// Matches at a word start only, so "נשמע ש" also catches "נשמע שזה".
fn interpretive_match(text: &str, phrase: &str) -> bool {
    let lower = text.to_lowercase();
    let phrase = phrase.to_lowercase();
    lower.match_indices(&phrase).any(|(start, _)| {
        lower[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric())
    })
}

/// `I hear: X, Y.` with every item taken from the utterance.
fn is_list_echo(opener: &str, source: &[String]) -> bool {
    let Some(body) = opener.strip_prefix(LIST_ECHO_PREFIX) else {
        return false;
    };
    let Some(body) = body.strip_suffix('.') else {
        return false;
    };
    let items: Vec<&str> = body.split(',').map(str::trim).collect();
    !items.is_empty()
        && items.iter().all(|item| {
            let words = normalized_words(item);
            !words.is_empty() && words.iter().all(|w| source.contains(w))
        })
}
