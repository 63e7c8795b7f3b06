//! Stage Orchestration Engine
//!
//! Everything that happens between receiving a human utterance and
//! returning the next system utterance:
//!
//! - `gate` decides ADVANCE or LOOP and extracts field values
//! - `accumulator` merges those values into the session
//! - `guard` applies loop, confusion and regression rules
//! - `composer` renders the reply, with an optional checked opener
//! - `orchestrator` runs the pipeline for one turn

mod accumulator;
mod composer;
mod decision;
mod gate;
mod guard;
mod insights;
mod opener;
mod orchestrator;
mod settings;
mod signals;
pub mod similarity;
pub mod tokenizer;

pub use accumulator::{Accumulator, MergeReport};
pub use composer::{ComposeRequest, ComposedResponse, ComposerSettings, ResponseComposer};
pub use decision::{AdaptiveTrigger, Composition, GateDecision, GateOutcome, StrictnessProfile};
pub use gate::{GateContext, GateEvaluator};
pub use guard::{GuardInput, GuardRule, GuardVerdict, LoopGuard, Transition, REGRESSION_BLOCK_MIN_TURNS};
pub use insights::{InsightSnapshot, StageInsight};
pub use opener::{OpenerPolicy, OpenerRejection, INTERPRETIVE_PHRASES};
pub use orchestrator::{TurnInput, TurnOrchestrator, TurnOutput, TurnSummary};
pub use settings::EngineConfig;
pub use signals::UtteranceSignals;
