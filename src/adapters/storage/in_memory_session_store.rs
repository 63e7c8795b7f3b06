//! In-Memory Session Store Adapter
//!
//! Keeps session state in memory. Used by tests and the interactive binary
//! when no storage directory is configured.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::ConversationId;
use crate::domain::session::SessionState;
use crate::ports::{SessionStore, SessionStoreError};

#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    states: Arc<RwLock<HashMap<ConversationId, SessionState>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions
    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, state: &SessionState) -> Result<(), SessionStoreError> {
        self.states
            .write()
            .await
            .insert(state.conversation_id(), state.clone());
        Ok(())
    }

    async fn load(&self, conversation_id: ConversationId) -> Result<SessionState, SessionStoreError> {
        self.states
            .read()
            .await
            .get(&conversation_id)
            .cloned()
            .ok_or(SessionStoreError::NotFound(conversation_id))
    }

    async fn exists(&self, conversation_id: ConversationId) -> Result<bool, SessionStoreError> {
        Ok(self.states.read().await.contains_key(&conversation_id))
    }

    async fn delete(&self, conversation_id: ConversationId) -> Result<(), SessionStoreError> {
        self.states.write().await.remove(&conversation_id);
        Ok(())
    }
}
