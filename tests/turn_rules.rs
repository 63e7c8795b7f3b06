//! Turn-level rules exercised through the public engine API: semantic
//! gating with fallback, regression and skip handling, anti-repetition,
//! completion thresholds and reflection openers.

use std::sync::Arc;
use std::time::Duration;

use coach_engine::adapters::judgment::ScriptedJudge;
use coach_engine::adapters::realization::ScriptedRealizer;
use coach_engine::domain::engine::similarity::jaccard;
use coach_engine::domain::engine::{
    AdaptiveTrigger, Composition, EngineConfig, GateOutcome, GuardRule, StrictnessProfile,
    TurnInput, TurnOrchestrator, TurnOutput,
};
use coach_engine::domain::foundation::{ConversationId, StageId};
use coach_engine::domain::session::SessionState;
use coach_engine::ports::{ContentRealizer, Judgment, RealizeError, SemanticJudge};

// =============================================================================
// Test Infrastructure
// =============================================================================

const SPECIFIC_EVENT: &str = "Yesterday at the team meeting my manager ignored my idea";

/// An answer that completes `stage` under the deterministic profile.
fn answer(stage: StageId) -> &'static str {
    match stage {
        StageId::Topic => "my relationship with my manager",
        StageId::Event => SPECIFIC_EVENT,
        StageId::Emotions => "anger, shame, fear, envy",
        StageId::Thought => "nobody listens to me",
        StageId::Action => "I stayed quiet",
        StageId::Gap => "8 silence",
        StageId::Pattern => "this always happens when I speak up",
        StageId::Stance => "I avoid conflict but lose my voice",
        StageId::Forces => "patience, honesty, humor, persistence",
        StageId::Choice => "I choose to speak in the next meeting",
        StageId::Vision => "I speak calmly and people listen",
        StageId::Commitment => "on Sunday I will raise one point",
    }
}

fn engine(judge: Option<ScriptedJudge>, realizer: Option<ScriptedRealizer>) -> TurnOrchestrator {
    engine_with(EngineConfig::default(), judge, realizer)
}

fn engine_with(
    config: EngineConfig,
    judge: Option<ScriptedJudge>,
    realizer: Option<ScriptedRealizer>,
) -> TurnOrchestrator {
    TurnOrchestrator::new(
        &config,
        judge.map(|j| Arc::new(j) as Arc<dyn SemanticJudge>),
        realizer.map(|r| Arc::new(r) as Arc<dyn ContentRealizer>),
    )
    .unwrap()
}

async fn say(engine: &TurnOrchestrator, state: SessionState, utterance: &str) -> TurnOutput {
    engine
        .process_turn(TurnInput::new(state, utterance, "en"))
        .await
}

async fn say_deterministic(
    engine: &TurnOrchestrator,
    state: SessionState,
    utterance: &str,
) -> TurnOutput {
    engine
        .process_turn(
            TurnInput::new(state, utterance, "en").with_profile(StrictnessProfile::Deterministic),
        )
        .await
}

/// Drives a fresh conversation with real turns until it sits at `target`.
async fn reach(engine: &TurnOrchestrator, target: StageId) -> SessionState {
    let (mut state, _) = engine.start(ConversationId::new());
    while state.current_stage() < target {
        let stage = state.current_stage();
        let utterance = if stage == StageId::Choice && state.collected().contains("choice") {
            "yes"
        } else {
            answer(stage)
        };
        state = say_deterministic(engine, state, utterance).await.state;
    }
    assert_eq!(state.current_stage(), target);
    state
}

// =============================================================================
// Semantic gating
// =============================================================================

#[tokio::test]
async fn vague_event_is_rejected_by_the_judge() {
    let judge = ScriptedJudge::rejecting();
    let engine = engine(Some(judge.clone()), None);
    let state = reach(&engine, StageId::Event).await;

    let out = say(&engine, state, "I always get ignored at work").await;

    assert_eq!(out.stage, StageId::Event);
    assert_eq!(out.decision.outcome, GateOutcome::Loop);
    assert!(out.decision.rationale.contains("not specific enough"));
    assert!(!out.decision.degraded);
    assert_eq!(judge.requests().len(), 1);
}

#[tokio::test]
async fn judge_sees_the_whole_narrative_so_far() {
    let judge = ScriptedJudge::approving()
        .then(Ok(Judgment::no("no time given")))
        .then(Ok(Judgment::yes("names the meeting")));
    let engine = engine(Some(judge.clone()), None);
    let state = reach(&engine, StageId::Event).await;

    let first = say(&engine, state, "my manager ignored my idea").await;
    assert_eq!(first.stage, StageId::Event);

    let second = say(&engine, first.state, "it was yesterday in the team meeting").await;
    assert_eq!(second.stage, StageId::Emotions);

    let requests = judge.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].text.contains("my manager ignored my idea"));
    assert!(requests[1].text.contains("yesterday in the team meeting"));
    assert_eq!(requests[1].stage, StageId::Event);
}

#[tokio::test]
async fn judge_outage_falls_back_to_the_surface_check() {
    let engine = engine(Some(ScriptedJudge::unavailable()), None);

    let specific = say(&engine, reach(&engine, StageId::Event).await, SPECIFIC_EVENT).await;
    assert_eq!(specific.stage, StageId::Emotions);
    assert!(specific.decision.degraded);

    let vague = say(
        &engine,
        reach(&engine, StageId::Event).await,
        "I get ignored a lot at work",
    )
    .await;
    assert_eq!(vague.stage, StageId::Event);
    assert!(vague.decision.degraded);
}

#[tokio::test]
async fn slow_judge_times_out_into_the_fallback() {
    let config = EngineConfig {
        judge_timeout_ms: 20,
        ..Default::default()
    };
    let judge = ScriptedJudge::approving().with_delay(Duration::from_millis(300));
    let engine = engine_with(config, Some(judge), None);
    let state = reach(&engine, StageId::Event).await;

    let out = say(&engine, state, "work has been hard for me lately").await;

    // The judge would have approved; the fallback finds no time marker.
    assert_eq!(out.stage, StageId::Event);
    assert!(out.decision.degraded);
}

#[tokio::test]
async fn deterministic_profile_never_asks_the_judge() {
    let judge = ScriptedJudge::approving();
    let engine = engine(Some(judge.clone()), None);
    let state = reach(&engine, StageId::Event).await;

    let out = say_deterministic(&engine, state, "work has been hard for me lately").await;

    assert_eq!(out.stage, StageId::Event);
    assert!(judge.requests().is_empty());
}

// =============================================================================
// Regression and skips
// =============================================================================

#[tokio::test]
async fn backward_request_after_two_turns_is_redirected() {
    let engine = engine(None, None);
    let state = reach(&engine, StageId::Emotions).await;
    assert_eq!(state.turn_count(), 2);

    let out = engine
        .process_turn(
            TurnInput::new(state, "anger, shame, fear, envy", "en")
                .with_profile(StrictnessProfile::Deterministic)
                .with_requested_stage(StageId::Topic),
        )
        .await;

    assert_eq!(out.stage, StageId::Emotions);
    assert_eq!(out.decision.composition, Composition::Redirect);
    assert!(out.decision.rules.contains(&GuardRule::RegressionBlocked));
    assert!(out.utterance.starts_with("Let's keep moving forward from here."));
}

#[tokio::test]
async fn early_backward_request_is_neutralized() {
    let engine = engine(None, None);
    let state = reach(&engine, StageId::Event).await;
    assert_eq!(state.turn_count(), 1);

    let out = engine
        .process_turn(
            TurnInput::new(state, SPECIFIC_EVENT, "en")
                .with_profile(StrictnessProfile::Deterministic)
                .with_requested_stage(StageId::Topic),
        )
        .await;

    assert_eq!(out.stage, StageId::Event);
    assert!(matches!(out.decision.composition, Composition::Loop { .. }));
    assert!(out.decision.rules.contains(&GuardRule::RegressionNeutralized));
}

#[tokio::test]
async fn forward_skip_moves_one_stage_only() {
    let engine = engine(None, None);
    let state = reach(&engine, StageId::Event).await;

    let out = engine
        .process_turn(
            TurnInput::new(state, SPECIFIC_EVENT, "en")
                .with_profile(StrictnessProfile::Deterministic)
                .with_requested_stage(StageId::Vision),
        )
        .await;

    assert_eq!(out.stage, StageId::Emotions);
    assert!(out.decision.rules.contains(&GuardRule::SkipNeutralized));
}

// =============================================================================
// Anti-repetition
// =============================================================================

#[tokio::test]
async fn stuck_stage_switches_to_new_wording() {
    let engine = engine(None, None);
    let mut state = reach(&engine, StageId::Emotions).await;

    let mut replies = Vec::new();
    for _ in 0..4 {
        let out = say_deterministic(&engine, state, "anger").await;
        assert_eq!(out.stage, StageId::Emotions);
        replies.push((out.utterance, out.decision));
        state = out.state;
    }

    let (first, _) = &replies[0];
    let (second, _) = &replies[1];
    let (third, third_decision) = &replies[2];
    let (fourth, _) = &replies[3];

    assert_eq!(
        third_decision.composition,
        Composition::AdaptiveLoop {
            trigger: AdaptiveTrigger::StuckLoop
        }
    );
    assert!(third_decision.rules.contains(&GuardRule::StuckLoop));
    assert_ne!(third, first);
    assert_ne!(third, second);
    assert!(third.contains("Naming several feelings"));
    assert_ne!(fourth, third);
}

#[tokio::test]
async fn long_stuck_streak_never_nears_a_recent_reply() {
    let config = EngineConfig::default();
    let threshold = config.repeat_similarity_threshold;
    let window = config.history_window;
    let engine = engine_with(config, None, None);
    let mut state = reach(&engine, StageId::Emotions).await;

    let mut replies: Vec<String> = Vec::new();
    for turn in 0..12 {
        let out = say_deterministic(&engine, state, "anger").await;
        assert_eq!(out.stage, StageId::Emotions);
        if turn >= 2 {
            assert!(matches!(
                out.decision.composition,
                Composition::AdaptiveLoop { .. }
            ));
            let start = replies.len().saturating_sub(window);
            for earlier in &replies[start..] {
                let similarity = jaccard(&out.utterance, earlier);
                assert!(
                    similarity < threshold,
                    "turn {} is {:.2} similar to an earlier reply",
                    turn + 1,
                    similarity
                );
            }
        }
        replies.push(out.utterance);
        state = out.state;
    }
}

#[tokio::test]
async fn list_answer_with_a_meta_question_still_counts() {
    let engine = engine(None, None);
    let state = reach(&engine, StageId::Emotions).await;

    let out = say_deterministic(
        &engine,
        state,
        "anger, shame, fear, envy, I don't understand why you ask",
    )
    .await;

    assert_eq!(out.stage, StageId::Thought);
    assert!(out.decision.rules.contains(&GuardRule::Confusion));
    let emotions = out.insights.stage(StageId::Emotions).unwrap();
    assert!(emotions.complete);
    assert_eq!(
        out.state.collected().list("emotions").to_vec(),
        vec!["anger", "shame", "fear", "envy"]
    );
}

#[tokio::test]
async fn event_narrative_quoting_a_question_advances() {
    let engine = engine(None, None);
    let state = reach(&engine, StageId::Event).await;

    let out = say_deterministic(
        &engine,
        state,
        "Yesterday at the team meeting I shared my idea and my manager just said what?",
    )
    .await;

    assert_eq!(out.stage, StageId::Emotions);
    assert_eq!(out.decision.outcome, GateOutcome::Advance);
}

#[tokio::test]
async fn meta_question_gets_an_explanation_without_judging() {
    let judge = ScriptedJudge::approving();
    let engine = engine(Some(judge.clone()), None);
    let state = reach(&engine, StageId::Event).await;

    let out = say(&engine, state, "what do you mean").await;

    assert_eq!(out.stage, StageId::Event);
    assert_eq!(
        out.decision.composition,
        Composition::AdaptiveLoop {
            trigger: AdaptiveTrigger::Confusion
        }
    );
    assert!(judge.requests().is_empty());
}

// =============================================================================
// Completion thresholds
// =============================================================================

#[tokio::test]
async fn emotions_need_four_distinct_entries() {
    let engine = engine(None, None);
    let state = reach(&engine, StageId::Emotions).await;

    let out = say_deterministic(&engine, state, "anger, shame, fear").await;
    assert_eq!(out.decision.missing_count, Some(1));

    let out = say_deterministic(&engine, out.state, "Anger").await;
    assert_eq!(out.stage, StageId::Emotions);
    assert_eq!(out.decision.missing_count, Some(1));

    let out = say_deterministic(&engine, out.state, "guilt").await;
    assert_eq!(out.stage, StageId::Thought);
}

#[tokio::test]
async fn closure_phrase_completes_a_substantial_stage() {
    let engine = engine(None, None);
    let state = reach(&engine, StageId::Emotions).await;

    let out = say_deterministic(&engine, state, "anger, shame, that's all").await;

    assert_eq!(out.stage, StageId::Thought);
    assert!(out.decision.rules.contains(&GuardRule::CompletionSignal));
    assert_eq!(out.state.collected().list_len("emotions"), 2);
}

#[tokio::test]
async fn closure_phrase_is_not_enough_on_its_own() {
    let engine = engine(None, None);
    let state = reach(&engine, StageId::Emotions).await;

    let out = say_deterministic(&engine, state, "anger, that's all").await;

    assert_eq!(out.stage, StageId::Emotions);
    assert_eq!(out.decision.missing_count, Some(3));
}

#[tokio::test]
async fn choice_waits_for_explicit_confirmation() {
    let engine = engine(None, None);
    let state = reach(&engine, StageId::Choice).await;

    let captured = say_deterministic(&engine, state, answer(StageId::Choice)).await;
    assert_eq!(captured.stage, StageId::Choice);

    let declined = say_deterministic(&engine, captured.state, "no").await;
    assert_eq!(declined.stage, StageId::Choice);

    let confirmed = say_deterministic(&engine, declined.state, "yes").await;
    assert_eq!(confirmed.stage, StageId::Vision);
}

// =============================================================================
// Reflection openers
// =============================================================================

#[tokio::test]
async fn faithful_list_echo_opens_a_loop_reply_once() {
    let realizer = ScriptedRealizer::new()
        .then_line("I hear: anger, shame.")
        .then_line("I hear: anger, shame.");
    let engine = engine(None, Some(realizer.clone()));
    let state = reach(&engine, StageId::Emotions).await;

    let first = say_deterministic(&engine, state, "anger, shame").await;
    assert!(first.decision.opener_included);
    assert!(first.utterance.starts_with("I hear: anger, shame."));

    // Same echo again is suppressed as repetitive.
    let second = say_deterministic(&engine, first.state, "anger, shame").await;
    assert!(!second.decision.opener_included);
    assert!(!second.utterance.starts_with("I hear:"));
    assert_eq!(realizer.requests().len(), 2);
}

#[tokio::test]
async fn interpretive_or_failed_openers_are_dropped() {
    let realizer = ScriptedRealizer::new()
        .then_line("It sounds like you felt hurt.")
        .then(Err(RealizeError::Unavailable("down".to_string())));
    let engine = engine(None, Some(realizer));
    let state = reach(&engine, StageId::Event).await;

    let first = say_deterministic(&engine, state, "my manager ignored me").await;
    assert_eq!(first.stage, StageId::Event);
    assert!(!first.decision.opener_included);
    assert!(!first.utterance.contains("sounds like"));

    let second = say_deterministic(&engine, first.state, "my manager ignored me").await;
    assert!(!second.decision.opener_included);
    assert!(!second.utterance.is_empty());
}

#[tokio::test]
async fn advancing_reply_has_no_opener_by_default() {
    let realizer = ScriptedRealizer::new().then_line("You said: my manager.");
    let engine = engine(None, Some(realizer.clone()));
    let (state, _) = engine.start(ConversationId::new());

    let out = say_deterministic(&engine, state, "my manager").await;

    assert_eq!(out.stage, StageId::Event);
    assert!(!out.decision.opener_included);
    assert!(realizer.requests().is_empty());
}
