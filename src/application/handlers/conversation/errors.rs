//! Errors surfaced by conversation handlers.

use thiserror::Error;

use crate::domain::foundation::ConversationId;
use crate::ports::SessionStoreError;

#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("conversation not found: {0}")]
    NotFound(ConversationId),

    #[error("conversation already exists: {0}")]
    AlreadyExists(ConversationId),

    #[error("session storage failed: {0}")]
    Storage(SessionStoreError),
}

impl From<SessionStoreError> for ConversationError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(id) => ConversationError::NotFound(id),
            other => ConversationError::Storage(other),
        }
    }
}
