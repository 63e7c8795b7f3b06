//! Conversation command and query handlers.

mod errors;
mod get_insights;
mod process_turn;
mod reset_conversation;
mod start_conversation;

pub use errors::ConversationError;
pub use get_insights::{GetInsightsHandler, GetInsightsQuery};
pub use process_turn::{ProcessTurnCommand, ProcessTurnHandler};
pub use reset_conversation::{
    ResetConversationCommand, ResetConversationHandler, ResetConversationResult,
};
pub use start_conversation::{
    StartConversationCommand, StartConversationHandler, StartConversationResult,
};
