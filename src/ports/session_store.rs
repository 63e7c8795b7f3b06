//! Session Store Port - Interface for persisting session state.
//!
//! The engine itself never persists anything; the application layer loads a
//! `SessionState`, runs a turn, and saves the returned state through this port.

use async_trait::async_trait;

use crate::domain::foundation::ConversationId;
use crate::domain::session::SessionState;

/// Errors that can occur during session storage operations
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session not found for conversation: {0}")]
    NotFound(ConversationId),

    #[error("Failed to serialize session: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize session: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for persisting and loading session state
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Save session state, replacing any previous version
    ///
    /// # Errors
    /// Returns `SessionStoreError` if save fails
    async fn save(&self, state: &SessionState) -> Result<(), SessionStoreError>;

    /// Load session state
    ///
    /// # Errors
    /// Returns `SessionStoreError::NotFound` if no state exists
    async fn load(&self, conversation_id: ConversationId) -> Result<SessionState, SessionStoreError>;

    /// Check if state exists for a conversation
    async fn exists(&self, conversation_id: ConversationId) -> Result<bool, SessionStoreError>;

    /// Delete state for a conversation. Deleting a missing session is not an error.
    async fn delete(&self, conversation_id: ConversationId) -> Result<(), SessionStoreError>;
}
