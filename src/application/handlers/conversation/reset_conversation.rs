//! ResetConversationHandler - Explicit user reset back to the first stage.

use std::sync::Arc;

use crate::application::ConversationLocks;
use crate::domain::engine::TurnOrchestrator;
use crate::domain::foundation::{ConversationId, StageId};
use crate::ports::SessionStore;

use super::errors::ConversationError;

#[derive(Debug, Clone)]
pub struct ResetConversationCommand {
    pub conversation_id: ConversationId,
}

#[derive(Debug, Clone)]
pub struct ResetConversationResult {
    pub stage: StageId,
    pub utterance: String,
}

pub struct ResetConversationHandler {
    engine: Arc<TurnOrchestrator>,
    store: Arc<dyn SessionStore>,
    locks: ConversationLocks,
}

impl ResetConversationHandler {
    pub fn new(
        engine: Arc<TurnOrchestrator>,
        store: Arc<dyn SessionStore>,
        locks: ConversationLocks,
    ) -> Self {
        Self {
            engine,
            store,
            locks,
        }
    }

    pub async fn handle(
        &self,
        cmd: ResetConversationCommand,
    ) -> Result<ResetConversationResult, ConversationError> {
        let _guard = self.locks.acquire(cmd.conversation_id).await;

        let mut state = self.store.load(cmd.conversation_id).await?;
        let from = state.current_stage();
        state.reset();
        self.store.save(&state).await?;

        tracing::info!(
            conversation_id = %cmd.conversation_id,
            from = %from,
            "Conversation reset"
        );

        Ok(ResetConversationResult {
            stage: state.current_stage(),
            utterance: self.engine.opening(&state),
        })
    }
}
