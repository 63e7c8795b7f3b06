//! GetInsightsHandler - Read-only view of a conversation's collected data.

use std::sync::Arc;

use crate::domain::engine::{InsightSnapshot, TurnOrchestrator};
use crate::domain::foundation::ConversationId;
use crate::ports::SessionStore;

use super::errors::ConversationError;

#[derive(Debug, Clone)]
pub struct GetInsightsQuery {
    pub conversation_id: ConversationId,
}

pub struct GetInsightsHandler {
    engine: Arc<TurnOrchestrator>,
    store: Arc<dyn SessionStore>,
}

impl GetInsightsHandler {
    pub fn new(engine: Arc<TurnOrchestrator>, store: Arc<dyn SessionStore>) -> Self {
        Self { engine, store }
    }

    pub async fn handle(&self, query: GetInsightsQuery) -> Result<InsightSnapshot, ConversationError> {
        let state = self.store.load(query.conversation_id).await?;
        Ok(self.engine.insights(&state))
    }
}
