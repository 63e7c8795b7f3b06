//! Response Composer
//!
//! Turns the guard's `Composition` into the next system utterance. The
//! mapping is a single total `match`; the optional reflection opener is
//! requested separately and dropped whenever it fails policy.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{ConversationId, StageId};
use crate::domain::session::SessionState;
use crate::domain::stage::{OpenerFormat, StageDefinition, StageRegistry};
use crate::ports::{ContentRealizer, RealizationRequest};

use super::decision::{AdaptiveTrigger, Composition};
use super::opener::OpenerPolicy;
use super::similarity::max_similarity;

const REDIRECT_PREFIX: &str = "Let's keep moving forward from here.";

const STUCK_ACKNOWLEDGMENTS: &[&str] = &[
    "Let me ask this another way.",
    "I may not have asked this clearly.",
    "Let's come at this from a different side.",
    "Thanks for staying with me on this one.",
];

const CONFUSION_ACKNOWLEDGMENTS: &[&str] = &[
    "Good question, let me explain.",
    "Let me clarify what I mean.",
    "Fair enough, that was not clear.",
    "Happy to explain.",
];

#[derive(Debug, Clone)]
pub struct ComposerSettings {
    pub opener_on_advance: bool,
    pub opener_on_loop: bool,
    pub realizer_timeout: Duration,
    /// Adaptive prompts must stay below this similarity to recent prompts.
    pub repeat_threshold: f64,
}

/// Inputs for composing one reply. `state` is the post-transition state.
pub struct ComposeRequest<'a> {
    pub conversation_id: ConversationId,
    pub registry: &'a StageRegistry,
    pub state: &'a SessionState,
    /// Stage the human was answering.
    pub answered: StageId,
    pub composition: Composition,
    pub utterance: &'a str,
    pub language: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedResponse {
    pub utterance: String,
    pub opener: Option<String>,
}

pub struct ResponseComposer {
    realizer: Option<Arc<dyn ContentRealizer>>,
    policy: OpenerPolicy,
    settings: ComposerSettings,
}

impl ResponseComposer {
    pub fn new(
        realizer: Option<Arc<dyn ContentRealizer>>,
        policy: OpenerPolicy,
        settings: ComposerSettings,
    ) -> Self {
        Self {
            realizer,
            policy,
            settings,
        }
    }

    /// Opening line of a fresh conversation.
    pub fn opening(&self, registry: &StageRegistry, state: &SessionState) -> String {
        registry
            .get(state.current_stage())
            .advance_script
            .render(state.collected())
    }

    pub async fn compose(&self, request: ComposeRequest<'_>) -> ComposedResponse {
        let body = self.body(&request);
        let opener = if self.wants_opener(&request.composition) {
            self.opener(&request).await
        } else {
            None
        };

        let utterance = match &opener {
            Some(opener) => format!("{} {}", opener, body),
            None => body,
        };
        ComposedResponse { utterance, opener }
    }

    fn body(&self, request: &ComposeRequest<'_>) -> String {
        let collected = request.state.collected();
        let current = request.registry.get(request.state.current_stage());
        match request.composition {
            Composition::Advance { to } => request.registry.get(to).advance_script.render(collected),
            Composition::Loop { missing } => loop_prompt(current, request.state, missing),
            Composition::AdaptiveLoop { trigger } => self.adaptive(current, request.state, trigger),
            Composition::Redirect => {
                let missing = current.predicate.missing_count(collected);
                format!("{} {}", REDIRECT_PREFIX, loop_prompt(current, request.state, missing))
            }
            Composition::Concluded => request.registry.closing_script().render(collected),
        }
    }

    fn wants_opener(&self, composition: &Composition) -> bool {
        match composition {
            Composition::Advance { .. } => self.settings.opener_on_advance,
            Composition::Loop { .. } | Composition::AdaptiveLoop { .. } => {
                self.settings.opener_on_loop
            }
            Composition::Redirect | Composition::Concluded => false,
        }
    }

    async fn opener(&self, request: &ComposeRequest<'_>) -> Option<String> {
        let realizer = self.realizer.as_ref()?;
        if request.utterance.trim().is_empty() {
            return None;
        }
        let format = request.registry.get(request.answered).opener_format;
        let realization = RealizationRequest {
            conversation_id: request.conversation_id,
            stage: request.answered,
            directive: directive(format, self.policy.max_words()),
            source_text: request.utterance.to_string(),
            language: request.language.to_string(),
            max_words: self.policy.max_words(),
            format,
        };

        let generated =
            match tokio::time::timeout(self.settings.realizer_timeout, realizer.realize(realization))
                .await
            {
                Ok(Ok(text)) => text,
                Ok(Err(err)) => {
                    tracing::warn!(
                        conversation_id = %request.conversation_id,
                        stage = %request.answered,
                        error = %err,
                        "Realizer failed, omitting opener"
                    );
                    return None;
                }
                Err(_) => {
                    tracing::warn!(
                        conversation_id = %request.conversation_id,
                        stage = %request.answered,
                        "Realizer timed out, omitting opener"
                    );
                    return None;
                }
            };

        match self.policy.check(
            &generated,
            request.utterance,
            format,
            request.state.recent_openers(),
        ) {
            Ok(opener) => Some(opener),
            Err(rejection) => {
                tracing::warn!(
                    conversation_id = %request.conversation_id,
                    stage = %request.answered,
                    reason = %rejection,
                    "Suppressed reflection opener"
                );
                None
            }
        }
    }

    /// Acknowledge, explain, illustrate, then re-ask in words not used recently.
    fn adaptive(&self, definition: &StageDefinition, state: &SessionState, trigger: AdaptiveTrigger) -> String {
        let collected = state.collected();
        let acknowledgments = match trigger {
            AdaptiveTrigger::StuckLoop => STUCK_ACKNOWLEDGMENTS,
            AdaptiveTrigger::Confusion => CONFUSION_ACKNOWLEDGMENTS,
        };
        let example = definition.example.render(collected);
        let canonical = definition.advance_script.render(collected);
        let short = definition.loop_script.render(collected);

        let mut previous: Vec<&str> = state.recent_system_utterances(definition.id);
        // Question wording may not repeat from the last two prompts.
        let latest: Vec<&str> = previous.iter().rev().take(2).copied().collect();
        previous.push(&canonical);
        previous.push(&short);

        // Rotate the starting point so successive adaptive turns differ.
        let offset = state.loop_count(definition.id) as usize;
        let mut candidates = Vec::new();
        for (q, question) in definition.rephrasings.iter().enumerate() {
            for a in 0..acknowledgments.len() {
                let acknowledgment = acknowledgments[(a + q + offset) % acknowledgments.len()];
                let text = format!(
                    "{} {} {} {}",
                    acknowledgment, definition.rationale, example, question
                );
                candidates.push((question.as_str(), text));
            }
        }
        let count = candidates.len().max(1);
        candidates.rotate_left(offset % count);

        let scored: Vec<(f64, bool, String)> = candidates
            .into_iter()
            .map(|(question, text)| {
                let reused = latest.iter().any(|p| p.contains(question));
                let similarity = max_similarity(&text, previous.iter().copied());
                (similarity, reused, text)
            })
            .collect();

        if let Some((_, _, text)) = scored
            .iter()
            .find(|(similarity, reused, _)| !reused && *similarity < self.settings.repeat_threshold)
        {
            return text.clone();
        }

        tracing::warn!(
            stage = %definition.id,
            "No adaptive prompt below the repeat threshold, using the least similar"
        );
        scored
            .into_iter()
            .min_by(|a, b| {
                (a.1, a.0)
                    .partial_cmp(&(b.1, b.0))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(_, _, text)| text)
            .unwrap_or(short)
    }
}

fn loop_prompt(definition: &StageDefinition, state: &SessionState, missing: Option<usize>) -> String {
    let extras: Vec<(&str, String)> = missing
        .filter(|m| *m > 0)
        .map(|m| vec![("missing", m.to_string())])
        .unwrap_or_default();
    definition.loop_script.render_with(state.collected(), &extras)
}

fn directive(format: OpenerFormat, max_words: usize) -> String {
    match format {
        OpenerFormat::FreeText => format!(
            "Echo the speaker's own words back in at most {} words. Do not interpret, \
             add feelings, or add anything they did not say.",
            max_words
        ),
        OpenerFormat::ListEcho => format!(
            "List the items the speaker named, exactly in the form \"I hear: X, Y.\" \
             using only their words, in at most {} words.",
            max_words
        ),
    }
}
