//! Gate Evaluator
//!
//! Classifies one utterance against the current stage as ADVANCE or LOOP
//! and extracts the values it carries. Deterministic stages read surface
//! features; semantic stages ask the judge and fall back to a conservative
//! word-count plus keyword check when the judge is bypassed or fails.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::ConversationId;
use crate::domain::session::{CollectedData, FieldUpdates};
use crate::domain::stage::{
    CompletionPredicate, FallbackCheck, GateStrategy, SemanticCheck, StageDefinition,
};
use crate::domain::text::{contains_any, normalized_words, strip_phrases, word_count};
use crate::ports::{JudgmentRequest, SemanticJudge};

use super::accumulator::Accumulator;
use super::decision::{GateDecision, GateOutcome, StrictnessProfile};
use super::signals::{is_response_word, without_confusion, UtteranceSignals};
use super::tokenizer::{split_list, split_score};

/// Everything the gate looks at for one utterance.
pub struct GateContext<'a> {
    pub conversation_id: ConversationId,
    pub definition: &'a StageDefinition,
    pub collected: &'a CollectedData,
    pub utterance: &'a str,
    pub language: &'a str,
    pub signals: UtteranceSignals,
    pub profile: StrictnessProfile,
}

pub struct GateEvaluator {
    judge: Option<Arc<dyn SemanticJudge>>,
    judge_timeout: Duration,
}

impl GateEvaluator {
    pub fn new(judge: Option<Arc<dyn SemanticJudge>>, judge_timeout: Duration) -> Self {
        Self {
            judge,
            judge_timeout,
        }
    }

    pub async fn evaluate(&self, ctx: &GateContext<'_>) -> GateDecision {
        let definition = ctx.definition;
        let stage = definition.id;

        let content = strip_phrases(ctx.utterance, &definition.completion_signals);
        let content = content.trim().trim_matches(|c: char| c == ',' || c == ';').trim();
        // A meta-question never hides the answer given alongside it.
        let content = if ctx.signals.confused {
            let as_list = matches!(definition.predicate, CompletionPredicate::MinItems { .. });
            without_confusion(content, as_list)
        } else {
            content.to_string()
        };
        let content = content.as_str();

        let decision = match (&definition.predicate, &definition.strategy) {
            (CompletionPredicate::Confirmed { field, flag }, GateStrategy::Semantic(check)) => {
                self.semantic(ctx, content, field, flag, check).await
            }
            (CompletionPredicate::Confirmed { field, flag }, GateStrategy::Deterministic) => {
                confirmation(ctx, content, field, flag)
            }
            (CompletionPredicate::MinItems { field, .. }, _) => list_items(ctx, content, field),
            (CompletionPredicate::NonEmpty { field, .. }, _) => scalar(ctx, content, field),
            (CompletionPredicate::Scored { field, min, max }, _) => {
                score(ctx, content, field, *min, *max)
            }
        };

        tracing::debug!(
            conversation_id = %ctx.conversation_id,
            stage = %stage,
            outcome = %decision.outcome,
            missing = ?decision.missing_count,
            degraded = decision.degraded,
            rationale = %decision.rationale,
            "Gate evaluated utterance"
        );
        decision
    }

    fn without_updates(&self, ctx: &GateContext<'_>, rationale: &str) -> GateDecision {
        decide(ctx, FieldUpdates::new(), rationale.to_string())
    }

    async fn semantic(
        &self,
        ctx: &GateContext<'_>,
        content: &str,
        field: &str,
        flag: &str,
        check: &SemanticCheck,
    ) -> GateDecision {
        if content.is_empty() {
            return self.without_updates(ctx, "no new content to judge");
        }

        // Judge the whole narrative so far, not just the latest fragment.
        let narrative = match ctx.collected.text(field) {
            Some(previous) if !ctx.collected.flag(flag) => format!("{} {}", previous, content),
            _ => content.to_string(),
        };

        let (verdict, rationale, degraded) = match (&self.judge, ctx.profile) {
            (Some(judge), StrictnessProfile::Semantic) => {
                let request = JudgmentRequest {
                    conversation_id: ctx.conversation_id,
                    stage: ctx.definition.id,
                    question: check.question.clone(),
                    text: narrative.clone(),
                    language: ctx.language.to_string(),
                };
                match tokio::time::timeout(self.judge_timeout, judge.judge(request)).await {
                    Ok(Ok(judgment)) if judgment.verdict => (true, judgment.rationale, false),
                    Ok(Ok(judgment)) => (
                        false,
                        format!("not specific enough: {}", judgment.rationale),
                        false,
                    ),
                    Ok(Err(err)) => {
                        tracing::warn!(
                            conversation_id = %ctx.conversation_id,
                            stage = %ctx.definition.id,
                            error = %err,
                            "Semantic judge failed, using deterministic fallback"
                        );
                        let (verdict, rationale) = fallback(&check.fallback, &narrative);
                        (verdict, rationale, true)
                    }
                    Err(_) => {
                        tracing::warn!(
                            conversation_id = %ctx.conversation_id,
                            stage = %ctx.definition.id,
                            timeout_ms = self.judge_timeout.as_millis() as u64,
                            "Semantic judge timed out, using deterministic fallback"
                        );
                        let (verdict, rationale) = fallback(&check.fallback, &narrative);
                        (verdict, rationale, true)
                    }
                }
            }
            _ => {
                let (verdict, rationale) = fallback(&check.fallback, &narrative);
                (verdict, rationale, true)
            }
        };

        let updates = FieldUpdates::new()
            .text(field, narrative)
            .flag(flag, verdict);
        let mut decision = decide(ctx, updates, rationale);
        decision.degraded = degraded;
        decision
    }
}

/// Conservative surface check standing in for the semantic judge.
fn fallback(check: &FallbackCheck, text: &str) -> (bool, String) {
    let words = word_count(text);
    let has_marker = contains_any(text, &check.keywords);
    if words >= check.min_words && has_marker {
        (true, "fallback check: long enough and anchored by a marker".to_string())
    } else if !has_marker {
        (
            false,
            "not specific enough: no time or recurrence marker found".to_string(),
        )
    } else {
        (
            false,
            format!(
                "not specific enough: {} words, at least {} needed",
                words, check.min_words
            ),
        )
    }
}

fn list_items(ctx: &GateContext<'_>, content: &str, field: &str) -> GateDecision {
    let items = split_list(content);
    let rationale = if items.is_empty() {
        "no list entries found".to_string()
    } else {
        format!("found {} entries", items.len())
    };
    let updates = if items.is_empty() {
        FieldUpdates::new()
    } else {
        FieldUpdates::new().list(field, items)
    };
    decide(ctx, updates, rationale)
}

fn scalar(ctx: &GateContext<'_>, content: &str, field: &str) -> GateDecision {
    if content.is_empty() {
        return decide(ctx, FieldUpdates::new(), "no answer given".to_string());
    }
    decide(
        ctx,
        FieldUpdates::new().text(field, content),
        format!("answer has {} words", word_count(content)),
    )
}

fn score(ctx: &GateContext<'_>, content: &str, field: &str, min: i64, max: i64) -> GateDecision {
    let Some((value, label)) = split_score(content) else {
        return decide(ctx, FieldUpdates::new(), "no score found".to_string());
    };
    if !(min..=max).contains(&value) {
        return decide(
            ctx,
            FieldUpdates::new(),
            format!("score {} outside {}..={}", value, min, max),
        );
    }
    let mut updates = FieldUpdates::new().number(field, value);
    if let Some(label_field) = ctx.definition.label_field() {
        if !label.trim().is_empty() {
            updates = updates.text(label_field.name.clone(), label);
        }
    }
    decide(ctx, updates, format!("score {}", value))
}

/// Two-step confirmation: capture the answer, then require an explicit yes.
fn confirmation(ctx: &GateContext<'_>, content: &str, field: &str, flag: &str) -> GateDecision {
    let signals = ctx.signals;
    let pending = ctx.collected.contains(field);
    let substantive: Vec<String> = normalized_words(content)
        .into_iter()
        .filter(|w| !is_response_word(w))
        .collect();

    if pending && signals.affirmation && !signals.negation && substantive.len() <= 2 {
        return decide(
            ctx,
            FieldUpdates::new().flag(flag, true),
            "answer confirmed".to_string(),
        );
    }
    if substantive.is_empty() {
        let rationale = if signals.negation {
            "answer not confirmed"
        } else {
            "no answer given"
        };
        return decide(ctx, FieldUpdates::new().flag(flag, false), rationale.to_string());
    }
    decide(
        ctx,
        FieldUpdates::new().text(field, content).flag(flag, false),
        "answer captured, awaiting confirmation".to_string(),
    )
}

/// Applies the stage predicate to the preview of merged data.
fn decide(ctx: &GateContext<'_>, updates: FieldUpdates, rationale: String) -> GateDecision {
    let definition = ctx.definition;
    let merged = Accumulator::preview(ctx.collected, &updates);
    let satisfied = definition.predicate.is_satisfied(&merged);
    let current = definition.id;

    let (outcome, target_stage) = if satisfied {
        (GateOutcome::Advance, current.next().unwrap_or(current))
    } else {
        (GateOutcome::Loop, current)
    };

    GateDecision {
        outcome,
        rationale,
        missing_count: definition.predicate.missing_count(&merged),
        updates,
        target_stage,
        degraded: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::StageId;
    use crate::domain::stage::StageRegistry;
    use crate::ports::{JudgeError, Judgment};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FixedJudge(Result<Judgment, JudgeError>);

    #[async_trait]
    impl SemanticJudge for FixedJudge {
        async fn judge(&self, _request: JudgmentRequest) -> Result<Judgment, JudgeError> {
            self.0.clone()
        }
    }

    struct SlowJudge;

    #[async_trait]
    impl SemanticJudge for SlowJudge {
        async fn judge(&self, _request: JudgmentRequest) -> Result<Judgment, JudgeError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Judgment::yes("too late"))
        }
    }

    fn registry() -> StageRegistry {
        StageRegistry::standard(&HashMap::new(), 3).unwrap()
    }

    async fn run(
        gate: &GateEvaluator,
        stage: StageId,
        collected: &CollectedData,
        utterance: &str,
        profile: StrictnessProfile,
    ) -> GateDecision {
        let registry = registry();
        let definition = registry.get(stage);
        let ctx = GateContext {
            conversation_id: ConversationId::new(),
            definition,
            collected,
            utterance,
            language: "en",
            signals: UtteranceSignals::read(utterance, &definition.completion_signals),
            profile,
        };
        gate.evaluate(&ctx).await
    }

    fn offline() -> GateEvaluator {
        GateEvaluator::new(None, Duration::from_millis(50))
    }

    fn with(updates: FieldUpdates) -> CollectedData {
        let mut data = CollectedData::new();
        Accumulator::merge(&mut data, &updates);
        data
    }

    mod lists {
        use super::*;

        #[tokio::test]
        async fn loops_with_missing_count() {
            let decision = run(
                &offline(),
                StageId::Emotions,
                &CollectedData::new(),
                "כעס, קנאה",
                StrictnessProfile::Semantic,
            )
            .await;
            assert_eq!(decision.outcome, GateOutcome::Loop);
            assert_eq!(decision.missing_count, Some(2));
            assert_eq!(decision.target_stage, StageId::Emotions);
        }

        #[tokio::test]
        async fn counts_accumulated_entries() {
            let collected = with(FieldUpdates::new().list("emotions", ["כעס", "קנאה"]));
            let decision = run(
                &offline(),
                StageId::Emotions,
                &collected,
                "תסכול יאוש",
                StrictnessProfile::Semantic,
            )
            .await;
            assert_eq!(decision.outcome, GateOutcome::Advance);
            assert_eq!(decision.missing_count, Some(0));
            assert_eq!(decision.target_stage, StageId::Thought);
        }

        #[tokio::test]
        async fn one_new_entry_at_three_advances_and_a_duplicate_does_not() {
            let collected = with(FieldUpdates::new().list("emotions", ["anger", "shame", "fear"]));

            let duplicate = run(
                &offline(),
                StageId::Emotions,
                &collected,
                "anger",
                StrictnessProfile::Semantic,
            )
            .await;
            assert_eq!(duplicate.outcome, GateOutcome::Loop);
            assert_eq!(duplicate.missing_count, Some(1));

            let fresh = run(
                &offline(),
                StageId::Emotions,
                &collected,
                "guilt",
                StrictnessProfile::Semantic,
            )
            .await;
            assert_eq!(fresh.outcome, GateOutcome::Advance);
        }

        #[tokio::test]
        async fn completion_phrases_are_not_entries() {
            let decision = run(
                &offline(),
                StageId::Emotions,
                &CollectedData::new(),
                "anger, that's all",
                StrictnessProfile::Semantic,
            )
            .await;
            let merged = Accumulator::preview(&CollectedData::new(), &decision.updates);
            assert_eq!(merged.list("emotions"), ["anger".to_string()]);
        }
    }

    mod semantic {
        use super::*;

        #[tokio::test]
        async fn fallback_rejects_vague_event() {
            let decision = run(
                &offline(),
                StageId::Event,
                &CollectedData::new(),
                "it happened and it was awful",
                StrictnessProfile::Semantic,
            )
            .await;
            assert_eq!(decision.outcome, GateOutcome::Loop);
            assert!(decision.rationale.contains("specific"));
            assert!(decision.degraded);
        }

        #[tokio::test]
        async fn fallback_accepts_concrete_event() {
            let decision = run(
                &offline(),
                StageId::Event,
                &CollectedData::new(),
                "Yesterday in the team meeting my manager interrupted me twice",
                StrictnessProfile::Deterministic,
            )
            .await;
            assert_eq!(decision.outcome, GateOutcome::Advance);
        }

        #[tokio::test]
        async fn judge_verdict_decides() {
            let judge = GateEvaluator::new(
                Some(Arc::new(FixedJudge(Ok(Judgment::no("a general situation"))))),
                Duration::from_secs(1),
            );
            let decision = run(
                &judge,
                StageId::Event,
                &CollectedData::new(),
                "Yesterday my manager shouted at me in front of everyone",
                StrictnessProfile::Semantic,
            )
            .await;
            assert_eq!(decision.outcome, GateOutcome::Loop);
            assert!(decision.rationale.contains("a general situation"));
            assert!(!decision.degraded);
        }

        #[tokio::test]
        async fn deterministic_profile_bypasses_judge() {
            let judge = GateEvaluator::new(
                Some(Arc::new(FixedJudge(Ok(Judgment::yes("fine"))))),
                Duration::from_secs(1),
            );
            let decision = run(
                &judge,
                StageId::Event,
                &CollectedData::new(),
                "it happened and it was awful",
                StrictnessProfile::Deterministic,
            )
            .await;
            assert_eq!(decision.outcome, GateOutcome::Loop);
        }

        #[tokio::test]
        async fn judge_error_falls_back() {
            let judge = GateEvaluator::new(
                Some(Arc::new(FixedJudge(Err(JudgeError::Unavailable("down".into()))))),
                Duration::from_secs(1),
            );
            let decision = run(
                &judge,
                StageId::Event,
                &CollectedData::new(),
                "Yesterday in the team meeting my manager interrupted me twice",
                StrictnessProfile::Semantic,
            )
            .await;
            assert_eq!(decision.outcome, GateOutcome::Advance);
            assert!(decision.degraded);
        }

        #[tokio::test]
        async fn judge_timeout_falls_back() {
            let judge = GateEvaluator::new(Some(Arc::new(SlowJudge)), Duration::from_millis(100));
            let decision = run(
                &judge,
                StageId::Event,
                &CollectedData::new(),
                "it was awful",
                StrictnessProfile::Semantic,
            )
            .await;
            assert_eq!(decision.outcome, GateOutcome::Loop);
            assert!(decision.degraded);
        }

        #[tokio::test]
        async fn judges_the_combined_narrative() {
            let collected = with(
                FieldUpdates::new()
                    .text("event", "my manager cut me off")
                    .flag("event_concrete", false),
            );
            let decision = run(
                &offline(),
                StageId::Event,
                &collected,
                "it was yesterday in the meeting",
                StrictnessProfile::Deterministic,
            )
            .await;
            assert_eq!(decision.outcome, GateOutcome::Advance);
            let merged = Accumulator::preview(&collected, &decision.updates);
            assert_eq!(
                merged.text("event"),
                Some("my manager cut me off it was yesterday in the meeting")
            );
        }
    }

    mod confirmation {
        use super::*;

        #[tokio::test]
        async fn first_answer_is_captured_but_not_confirmed() {
            let decision = run(
                &offline(),
                StageId::Choice,
                &CollectedData::new(),
                "I choose to speak up in meetings",
                StrictnessProfile::Semantic,
            )
            .await;
            assert_eq!(decision.outcome, GateOutcome::Loop);
            let merged = Accumulator::preview(&CollectedData::new(), &decision.updates);
            assert_eq!(merged.text("choice"), Some("I choose to speak up in meetings"));
        }

        #[tokio::test]
        async fn affirmation_confirms_pending_answer() {
            let collected = with(FieldUpdates::new().text("choice", "speak up in meetings"));
            let decision = run(
                &offline(),
                StageId::Choice,
                &collected,
                "כן",
                StrictnessProfile::Semantic,
            )
            .await;
            assert_eq!(decision.outcome, GateOutcome::Advance);
        }

        #[tokio::test]
        async fn new_content_replaces_pending_answer() {
            let collected = with(FieldUpdates::new().text("choice", "stay quiet"));
            let decision = run(
                &offline(),
                StageId::Choice,
                &collected,
                "actually I want to ask for feedback",
                StrictnessProfile::Semantic,
            )
            .await;
            assert_eq!(decision.outcome, GateOutcome::Loop);
            let merged = Accumulator::preview(&collected, &decision.updates);
            assert_eq!(merged.text("choice"), Some("actually I want to ask for feedback"));
        }
    }

    #[tokio::test]
    async fn score_extracts_label() {
        let decision = run(
            &offline(),
            StageId::Gap,
            &CollectedData::new(),
            "7, avoidance",
            StrictnessProfile::Semantic,
        )
        .await;
        assert_eq!(decision.outcome, GateOutcome::Advance);
        let merged = Accumulator::preview(&CollectedData::new(), &decision.updates);
        assert_eq!(merged.number("gap_score"), Some(7));
        assert_eq!(merged.text("gap_name"), Some("avoidance"));
    }

    #[tokio::test]
    async fn out_of_range_score_loops() {
        let decision = run(
            &offline(),
            StageId::Gap,
            &CollectedData::new(),
            "15",
            StrictnessProfile::Semantic,
        )
        .await;
        assert_eq!(decision.outcome, GateOutcome::Loop);
        assert!(decision.updates.is_empty());
    }

    mod confusion {
        use super::*;

        #[tokio::test]
        async fn bare_meta_question_extracts_nothing() {
            let decision = run(
                &offline(),
                StageId::Event,
                &CollectedData::new(),
                "What moment are you talking about?",
                StrictnessProfile::Semantic,
            )
            .await;
            assert_eq!(decision.outcome, GateOutcome::Loop);
            assert!(decision.updates.is_empty());
        }

        #[tokio::test]
        async fn list_entries_next_to_a_meta_question_are_kept() {
            let decision = run(
                &offline(),
                StageId::Emotions,
                &CollectedData::new(),
                "anger, shame, fear, envy, I don't understand why you ask",
                StrictnessProfile::Semantic,
            )
            .await;
            assert_eq!(decision.outcome, GateOutcome::Advance);
            let merged = Accumulator::preview(&CollectedData::new(), &decision.updates);
            assert_eq!(merged.list("emotions").to_vec(), vec!["anger", "shame", "fear", "envy"]);
        }

        #[tokio::test]
        async fn narrative_quoting_a_question_is_judged() {
            let decision = run(
                &offline(),
                StageId::Event,
                &CollectedData::new(),
                "Yesterday at the team meeting my manager looked at me and said what?",
                StrictnessProfile::Deterministic,
            )
            .await;
            assert_eq!(decision.outcome, GateOutcome::Advance);
            assert!(!decision.updates.is_empty());
        }
    }

    #[tokio::test]
    async fn scalar_respects_min_words() {
        let short = run(
            &offline(),
            StageId::Thought,
            &CollectedData::new(),
            "nothing",
            StrictnessProfile::Semantic,
        )
        .await;
        assert_eq!(short.outcome, GateOutcome::Loop);

        let long = run(
            &offline(),
            StageId::Thought,
            &CollectedData::new(),
            "nobody listens to me",
            StrictnessProfile::Semantic,
        )
        .await;
        assert_eq!(long.outcome, GateOutcome::Advance);
    }
}
