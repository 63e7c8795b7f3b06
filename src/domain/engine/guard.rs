//! Loop/Regression Guard
//!
//! Pure rules applied, in order, to the gate's raw decision. Each rule may
//! override the ones before it:
//!
//! 1. stuck loop: the loop count reaches the stage threshold on a LOOP
//! 2. confusion: the human asked a meta-question
//! 3. already satisfied: the merged data meets the predicate on a LOOP
//! 4. completion signal: the human closed the stage with substantial data
//! 5. regression: a backward move is blocked, or neutralized early on
//!
//! The verdict is always exactly one effective transition. BLOCKED is
//! resolved here into a same-stage redirect.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StageId;
use crate::domain::session::{CollectedData, SessionState};
use crate::domain::stage::StageDefinition;

use super::decision::{AdaptiveTrigger, Composition, GateDecision, GateOutcome};
use super::signals::UtteranceSignals;

/// Turns after which a backward move is answered with a redirect.
pub const REGRESSION_BLOCK_MIN_TURNS: u32 = 2;

/// Rules that changed the raw decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardRule {
    StuckLoop,
    Confusion,
    AlreadySatisfied,
    CompletionSignal,
    RegressionBlocked,
    RegressionNeutralized,
    SkipNeutralized,
}

/// Effective move of the stage pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Advance(StageId),
    /// Advance out of the final stage.
    Conclude,
    Stay,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuardVerdict {
    pub transition: Transition,
    pub composition: Composition,
    /// Effective outcome: only `Advance` or `Loop`.
    pub outcome: GateOutcome,
    pub rationale: String,
    pub rules: Vec<GuardRule>,
}

pub struct GuardInput<'a> {
    pub definition: &'a StageDefinition,
    pub state: &'a SessionState,
    /// Collected data after merging this turn's updates.
    pub merged: &'a CollectedData,
    pub decision: &'a GateDecision,
    pub signals: UtteranceSignals,
    /// Stage the caller's UI asked to show, if any.
    pub requested_stage: Option<StageId>,
}

enum Mode {
    Advance,
    Loop,
    Adaptive(AdaptiveTrigger),
    Blocked,
}

pub struct LoopGuard;

impl LoopGuard {
    pub fn review(input: &GuardInput<'_>) -> GuardVerdict {
        let definition = input.definition;
        let state = input.state;
        let current = state.current_stage();
        let predicate = &definition.predicate;
        let mut rules = Vec::new();
        let mut rationale = input.decision.rationale.clone();

        let mut mode = match input.decision.outcome {
            GateOutcome::Advance => Mode::Advance,
            GateOutcome::Loop | GateOutcome::Blocked => Mode::Loop,
        };

        // 1. stuck loop
        let prospective = state.loop_count(current) + 1;
        if matches!(mode, Mode::Loop) && prospective >= definition.stuck_threshold {
            mode = Mode::Adaptive(AdaptiveTrigger::StuckLoop);
            rules.push(GuardRule::StuckLoop);
        }

        // 2. confusion changes the wording only; rule 3 still advances on
        // an answer given alongside the meta-question.
        if input.signals.confused {
            mode = Mode::Adaptive(AdaptiveTrigger::Confusion);
            rules.push(GuardRule::Confusion);
        }

        let looping = matches!(mode, Mode::Loop | Mode::Adaptive(_));

        // 3. already satisfied
        if looping && predicate.is_satisfied(input.merged) {
            mode = Mode::Advance;
            rules.push(GuardRule::AlreadySatisfied);
            rationale = "collected data already satisfies the stage".to_string();
        }

        // 4. completion signal
        if looping
            && !matches!(mode, Mode::Advance)
            && input.signals.closure
            && predicate.is_substantial(input.merged)
        {
            mode = Mode::Advance;
            rules.push(GuardRule::CompletionSignal);
            rationale = "the human closed the stage with enough data".to_string();
        }

        // 5. regression and skips
        let target = input.decision.target_stage;
        let backward = target < current || input.requested_stage.is_some_and(|s| s < current);
        if backward {
            if state.turn_count() >= REGRESSION_BLOCK_MIN_TURNS {
                tracing::error!(
                    conversation_id = %state.conversation_id(),
                    stage = %current,
                    target = %target,
                    requested = ?input.requested_stage,
                    "Blocked backward stage transition"
                );
                mode = Mode::Blocked;
                rules.push(GuardRule::RegressionBlocked);
                rationale = "backward move blocked".to_string();
            } else {
                tracing::warn!(
                    conversation_id = %state.conversation_id(),
                    stage = %current,
                    target = %target,
                    requested = ?input.requested_stage,
                    "Neutralized backward stage transition"
                );
                mode = Mode::Loop;
                rules.push(GuardRule::RegressionNeutralized);
                rationale = "backward move ignored".to_string();
            }
        }

        let next = current.next();
        let skips = |stage: StageId| stage > next.unwrap_or(current);
        if skips(target) || input.requested_stage.is_some_and(skips) {
            tracing::error!(
                conversation_id = %state.conversation_id(),
                stage = %current,
                target = %target,
                requested = ?input.requested_stage,
                "Neutralized forward skip"
            );
            rules.push(GuardRule::SkipNeutralized);
        }

        let missing = predicate.missing_count(input.merged);
        let (transition, composition, outcome) = match mode {
            Mode::Advance => match next {
                Some(to) => (
                    Transition::Advance(to),
                    Composition::Advance { to },
                    GateOutcome::Advance,
                ),
                None => (Transition::Conclude, Composition::Concluded, GateOutcome::Advance),
            },
            Mode::Loop => (Transition::Stay, Composition::Loop { missing }, GateOutcome::Loop),
            Mode::Adaptive(trigger) => (
                Transition::Stay,
                Composition::AdaptiveLoop { trigger },
                GateOutcome::Loop,
            ),
            Mode::Blocked => (Transition::Stay, Composition::Redirect, GateOutcome::Loop),
        };

        GuardVerdict {
            transition,
            composition,
            outcome,
            rationale,
            rules,
        }
    }
}
