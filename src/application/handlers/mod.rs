//! Application handlers.
//!
//! Command and query handlers that load sessions, run the engine and
//! persist the result.

pub mod conversation;

pub use conversation::{
    ConversationError, GetInsightsHandler, GetInsightsQuery, ProcessTurnCommand,
    ProcessTurnHandler, ResetConversationCommand, ResetConversationHandler,
    ResetConversationResult, StartConversationCommand, StartConversationHandler,
    StartConversationResult,
};
