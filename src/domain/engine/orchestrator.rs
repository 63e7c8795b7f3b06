//! Turn Orchestrator
//!
//! Runs one human turn through the pipeline:
//!
//! ```text
//! signals -> gate -> accumulator -> guard -> transition -> composer
//! ```
//!
//! The orchestrator owns no conversation state. The caller hands in the
//! current `SessionState` and receives the updated one, so persistence and
//! per-conversation serialization stay outside the engine.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::foundation::{ConversationId, StageId};
use crate::domain::session::SessionState;
use crate::domain::stage::{RegistryError, StageRegistry};
use crate::ports::{ContentRealizer, SemanticJudge};

use super::accumulator::Accumulator;
use super::composer::{ComposeRequest, ComposerSettings, ResponseComposer};
use super::decision::{Composition, GateOutcome, StrictnessProfile};
use super::gate::{GateContext, GateEvaluator};
use super::guard::{GuardInput, GuardRule, LoopGuard, Transition};
use super::insights::InsightSnapshot;
use super::opener::OpenerPolicy;
use super::settings::EngineConfig;
use super::signals::UtteranceSignals;

/// One human turn.
#[derive(Debug, Clone)]
pub struct TurnInput {
    pub state: SessionState,
    pub utterance: String,
    pub language: String,
    /// Overrides the configured profile for this turn.
    pub profile: Option<StrictnessProfile>,
    /// Stage the client believes is current. Only ever treated as a hint.
    pub requested_stage: Option<StageId>,
}

impl TurnInput {
    pub fn new(state: SessionState, utterance: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            state,
            utterance: utterance.into(),
            language: language.into(),
            profile: None,
            requested_stage: None,
        }
    }

    pub fn with_profile(mut self, profile: StrictnessProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn with_requested_stage(mut self, stage: StageId) -> Self {
        self.requested_stage = Some(stage);
        self
    }
}

/// How the turn was decided, for clients and logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnSummary {
    pub outcome: GateOutcome,
    pub rationale: String,
    pub missing_count: Option<usize>,
    pub composition: Composition,
    pub rules: Vec<GuardRule>,
    /// The semantic judge was skipped or failed.
    pub degraded: bool,
    pub opener_included: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnOutput {
    #[serde(skip)]
    pub state: SessionState,
    pub utterance: String,
    /// Stage the conversation is at after this turn.
    pub stage: StageId,
    pub decision: TurnSummary,
    pub insights: InsightSnapshot,
}

pub struct TurnOrchestrator {
    registry: StageRegistry,
    gate: GateEvaluator,
    composer: ResponseComposer,
    default_profile: StrictnessProfile,
    opener_window: usize,
    history_window: usize,
}

impl TurnOrchestrator {
    pub fn new(
        config: &EngineConfig,
        judge: Option<Arc<dyn SemanticJudge>>,
        realizer: Option<Arc<dyn ContentRealizer>>,
    ) -> Result<Self, RegistryError> {
        let registry =
            StageRegistry::standard(&config.stage_overrides, config.default_stuck_threshold)?;
        let policy = OpenerPolicy::new(
            config.opener_max_words,
            config.opener_similarity_threshold,
            &config.extra_interpretive_phrases,
        );
        let composer = ResponseComposer::new(
            realizer,
            policy,
            ComposerSettings {
                opener_on_advance: config.opener_on_advance,
                opener_on_loop: config.opener_on_loop,
                realizer_timeout: config.realizer_timeout(),
                repeat_threshold: config.repeat_similarity_threshold,
            },
        );

        Ok(Self {
            registry,
            gate: GateEvaluator::new(judge, config.judge_timeout()),
            composer,
            default_profile: config.default_profile,
            opener_window: config.opener_window,
            history_window: config.history_window,
        })
    }

    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    /// Fresh session plus the opening line of the first stage.
    pub fn start(&self, conversation_id: ConversationId) -> (SessionState, String) {
        let state =
            SessionState::with_windows(conversation_id, self.opener_window, self.history_window);
        let opening = self.opening(&state);
        tracing::info!(
            conversation_id = %conversation_id,
            stage = %state.current_stage(),
            "Conversation started"
        );
        (state, opening)
    }

    /// Script that opens the session's current stage.
    pub fn opening(&self, state: &SessionState) -> String {
        self.composer.opening(&self.registry, state)
    }

    pub fn insights(&self, state: &SessionState) -> InsightSnapshot {
        InsightSnapshot::build(&self.registry, state)
    }

    /// Processes one turn. Collaborator failures degrade the turn, they
    /// never fail it.
    pub async fn process_turn(&self, input: TurnInput) -> TurnOutput {
        let TurnInput {
            mut state,
            utterance,
            language,
            profile,
            requested_stage,
        } = input;
        let conversation_id = state.conversation_id();

        if state.is_concluded() {
            return self.concluded(state, &utterance);
        }

        let answered = state.current_stage();
        let definition = self.registry.get(answered);
        let signals = UtteranceSignals::read(&utterance, &definition.completion_signals);

        let decision = self
            .gate
            .evaluate(&GateContext {
                conversation_id,
                definition,
                collected: state.collected(),
                utterance: &utterance,
                language: &language,
                signals,
                profile: profile.unwrap_or(self.default_profile),
            })
            .await;

        let report = Accumulator::merge(state.collected_mut(), &decision.updates);
        tracing::debug!(
            conversation_id = %conversation_id,
            stage = %answered,
            added = report.added,
            duplicates = report.duplicates,
            replaced = ?report.replaced,
            "Merged turn updates"
        );

        let verdict = LoopGuard::review(&GuardInput {
            definition,
            state: &state,
            merged: state.collected(),
            decision: &decision,
            signals,
            requested_stage,
        });

        let mut composition = verdict.composition;
        match verdict.transition {
            Transition::Advance(next) => match state.advance_to(next) {
                Ok(()) => tracing::info!(
                    conversation_id = %conversation_id,
                    from = %answered,
                    to = %next,
                    rationale = %verdict.rationale,
                    "Stage advanced"
                ),
                Err(err) => {
                    tracing::error!(
                        conversation_id = %conversation_id,
                        error = %err,
                        "Refused illegal stage transition"
                    );
                    let missing = definition.predicate.missing_count(state.collected());
                    state.record_loop();
                    composition = Composition::Loop { missing };
                }
            },
            Transition::Conclude => {
                state.conclude();
                tracing::info!(
                    conversation_id = %conversation_id,
                    stage = %answered,
                    "Conversation concluded"
                );
            }
            Transition::Stay => {
                let loops = state.record_loop();
                tracing::debug!(
                    conversation_id = %conversation_id,
                    stage = %answered,
                    loops,
                    composition = ?composition,
                    "Stage looped"
                );
            }
        }

        let composed = self
            .composer
            .compose(ComposeRequest {
                conversation_id,
                registry: &self.registry,
                state: &state,
                answered,
                composition,
                utterance: &utterance,
                language: &language,
            })
            .await;

        if let Some(opener) = &composed.opener {
            state.remember_opener(opener);
        }
        state.record_exchange(answered, &utterance, &composed.utterance);

        let outcome = if composition.is_loop() {
            GateOutcome::Loop
        } else {
            GateOutcome::Advance
        };
        let missing_count = match composition {
            Composition::Loop { missing } => missing,
            _ => decision.missing_count,
        };

        TurnOutput {
            stage: state.current_stage(),
            insights: self.insights(&state),
            utterance: composed.utterance,
            decision: TurnSummary {
                outcome,
                rationale: verdict.rationale,
                missing_count,
                composition,
                rules: verdict.rules,
                degraded: decision.degraded,
                opener_included: composed.opener.is_some(),
            },
            state,
        }
    }

    fn concluded(&self, mut state: SessionState, utterance: &str) -> TurnOutput {
        let stage = state.current_stage();
        let closing = self.registry.closing_script().render(state.collected());
        state.record_exchange(stage, utterance, &closing);
        TurnOutput {
            stage,
            insights: self.insights(&state),
            utterance: closing,
            decision: TurnSummary {
                outcome: GateOutcome::Advance,
                rationale: "conversation already concluded".to_string(),
                missing_count: None,
                composition: Composition::Concluded,
                rules: Vec::new(),
                degraded: false,
                opener_included: false,
            },
            state,
        }
    }
}
