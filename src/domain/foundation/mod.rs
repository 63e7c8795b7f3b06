//! Foundation module - Shared domain primitives.
//!
//! Identifiers and the fixed stage ordering that the rest of the
//! coaching domain is expressed in.

mod ids;
mod stage_id;

pub use ids::ConversationId;
pub use stage_id::StageId;
