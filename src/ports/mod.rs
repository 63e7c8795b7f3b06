//! Ports - Interfaces for external dependencies.
//!
//! The engine never talks to a model or a disk directly. It depends on
//! these traits and adapters implement them.
//!
//! - `AIProvider` - Raw text completion
//! - `SemanticJudge` - Yes/no judgment on a human answer
//! - `ContentRealizer` - Short reflection openers
//! - `SessionStore` - Persistence of conversation state

mod ai_provider;
mod content_realizer;
mod semantic_judge;
mod session_store;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use content_realizer::{ContentRealizer, RealizationRequest, RealizeError};
pub use semantic_judge::{JudgeError, Judgment, JudgmentRequest, SemanticJudge};
pub use session_store::{SessionStore, SessionStoreError};
