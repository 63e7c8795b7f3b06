//! Semantic Judge Adapters
//!
//! - `LlmSemanticJudge` - Asks an `AIProvider` for a JSON verdict
//! - `ScriptedJudge` - Queued verdicts for tests and offline runs

mod llm_judge;
pub(crate) mod reply;
mod scripted_judge;

pub use llm_judge::LlmSemanticJudge;
pub use scripted_judge::ScriptedJudge;
