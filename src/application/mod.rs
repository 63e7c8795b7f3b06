//! Application layer - Commands, Queries, and Handlers.
//!
//! Coordinates the engine with the session store. Each handler is one use
//! case; turn-mutating handlers serialize on `ConversationLocks`.

mod conversation_locks;
pub mod handlers;

pub use conversation_locks::{ConversationGuard, ConversationLocks};
pub use handlers::{
    ConversationError, GetInsightsHandler, GetInsightsQuery, ProcessTurnCommand,
    ProcessTurnHandler, ResetConversationCommand, ResetConversationHandler,
    ResetConversationResult, StartConversationCommand, StartConversationHandler,
    StartConversationResult,
};
