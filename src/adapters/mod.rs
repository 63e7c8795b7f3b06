//! Adapters - Implementations of port interfaces.
//!
//! - `ai` - LLM providers (Anthropic, mock, failover)
//! - `judgment` - Semantic judges built on an AI provider
//! - `realization` - Opener realizers built on an AI provider
//! - `storage` - Session stores (file, in-memory)

pub mod ai;
pub mod judgment;
pub mod realization;
pub mod storage;

pub use ai::{AnthropicConfig, AnthropicProvider, FailoverAIProvider, MockAIProvider};
pub use judgment::{LlmSemanticJudge, ScriptedJudge};
pub use realization::{LlmContentRealizer, ScriptedRealizer};
pub use storage::{FileSessionStore, InMemorySessionStore};
