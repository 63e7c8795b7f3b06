//! Content Realizer Adapters
//!
//! - `LlmContentRealizer` - Generates opener lines through an `AIProvider`
//! - `ScriptedRealizer` - Queued lines for tests and offline runs

mod llm_realizer;
mod scripted_realizer;

pub use llm_realizer::LlmContentRealizer;
pub use scripted_realizer::ScriptedRealizer;
