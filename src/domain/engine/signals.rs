//! Surface signals read from a human utterance before gating.

use crate::domain::text::{contains_any, normalized_words, strip_phrases, trim_punctuation};

use super::tokenizer::is_filler;

/// Meta-questions showing the stage question was not understood.
const CONFUSION_MARKERS: &[&str] = &[
    "i don't understand",
    "i dont understand",
    "i do not understand",
    "don't get it",
    "what do you mean",
    "what moment",
    "which moment",
    "what are you asking",
    "what are you talking about",
    "not sure what you mean",
    "what does that mean",
    "when?",
    "what?",
    "huh?",
    "לא הבנתי",
    "לא מבין",
    "לא מבינה",
    "על איזה רגע",
    "איזה רגע",
    "מה זאת אומרת",
    "מה הכוונה",
    "למה אתה מתכוון",
    "למה את מתכוונת",
    "מתי?",
    "מה?",
];

/// Words that make up the rest of a meta-question once its marker is gone.
const META_WORDS: &[&str] = &[
    "why", "you", "ask", "asking", "mean", "means", "meant", "this", "that", "it", "what",
    "are", "do", "does", "about", "here", "question", "talking", "talk", "saying", "moment",
    "exactly", "sorry", "again", "huh", "by", "למה", "אתה", "את", "שואל", "שואלת", "מה", "זה", "כאן",
    "השאלה", "מדבר", "מדברת", "אומר", "אומרת", "רגע", "על", "בדיוק", "סליחה",
];

const AFFIRMATIONS: &[&str] = &[
    "yes", "yeah", "yep", "right", "correct", "exactly", "sure", "definitely", "confirmed",
    "that's it", "that's right", "כן", "נכון", "בדיוק", "אכן", "בטח", "מאשר", "מאשרת",
];

const NEGATIONS: &[&str] = &["no", "not", "nope", "don't", "isn't", "wrong", "לא", "ממש לא", "אין מצב"];

/// Signals derived from one utterance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UtteranceSignals {
    /// The human asked a meta-question about the prompt.
    pub confused: bool,
    /// The human said they are done with the stage.
    pub closure: bool,
    pub affirmation: bool,
    pub negation: bool,
}

impl UtteranceSignals {
    pub fn read<S: AsRef<str>>(utterance: &str, completion_signals: &[S]) -> Self {
        Self {
            confused: is_confused(utterance),
            closure: contains_any(utterance, completion_signals),
            affirmation: contains_any(utterance, AFFIRMATIONS),
            negation: contains_any(utterance, NEGATIONS),
        }
    }
}

fn is_confused(utterance: &str) -> bool {
    if contains_any(utterance, CONFUSION_MARKERS) {
        return true;
    }
    // A lone question word is a request to clarify, not an answer.
    let words = normalized_words(utterance);
    utterance.trim_end().ends_with('?')
        && words.len() == 1
        && is_question_word(&words[0])
}

/// Removes the meta-question from an utterance and keeps any real answer.
///
/// List answers keep every clause, minus the marker and meta words of the
/// clauses that carry one. Free text is kept whole unless nothing but the
/// meta-question remains.
pub fn without_confusion(text: &str, as_list: bool) -> String {
    if as_list {
        return text
            .split(|c: char| matches!(c, ',' | ';' | '\n'))
            .map(|clause| {
                if is_confused(clause) {
                    strip_phrases(clause, CONFUSION_MARKERS)
                        .split_whitespace()
                        .filter(|w| !is_meta(&trim_punctuation(w).to_lowercase()))
                        .collect::<Vec<_>>()
                        .join(" ")
                } else {
                    clause.trim().to_string()
                }
            })
            .filter(|clause| !clause.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
    }
    let residue = strip_phrases(text, CONFUSION_MARKERS);
    let substantive = normalized_words(&residue)
        .into_iter()
        .any(|w| !is_filler(&w) && !is_meta(&w));
    if substantive {
        text.to_string()
    } else {
        String::new()
    }
}

fn is_meta(word: &str) -> bool {
    word.is_empty() || META_WORDS.contains(&word) || is_question_word(word)
}

fn is_question_word(word: &str) -> bool {
    matches!(word, "when" | "what" | "who" | "where" | "which" | "מתי" | "מה" | "מי" | "איפה")
}

/// Words that only affirm or negate and carry no content of their own.
pub fn is_response_word(word: &str) -> bool {
    AFFIRMATIONS.iter().chain(NEGATIONS).any(|w| *w == word)
}
