//! StartConversationHandler - Creates a session and speaks the first stage.

use std::sync::Arc;

use crate::application::ConversationLocks;
use crate::domain::engine::TurnOrchestrator;
use crate::domain::foundation::{ConversationId, StageId};
use crate::domain::session::SessionState;
use crate::ports::SessionStore;

use super::errors::ConversationError;

#[derive(Debug, Clone, Default)]
pub struct StartConversationCommand {
    /// Caller-chosen id; a fresh one is generated when absent.
    pub conversation_id: Option<ConversationId>,
}

#[derive(Debug, Clone)]
pub struct StartConversationResult {
    pub conversation_id: ConversationId,
    pub stage: StageId,
    pub utterance: String,
    pub state: SessionState,
}

pub struct StartConversationHandler {
    engine: Arc<TurnOrchestrator>,
    store: Arc<dyn SessionStore>,
    locks: ConversationLocks,
}

impl StartConversationHandler {
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
        cmd: StartConversationCommand,
    ) -> Result<StartConversationResult, ConversationError> {
        let conversation_id = cmd.conversation_id.unwrap_or_default();
        // Check and save under one lock so a caller-chosen id starts once.
        let _guard = self.locks.acquire(conversation_id).await;
        if self.store.exists(conversation_id).await? {
            return Err(ConversationError::AlreadyExists(conversation_id));
        }

        let (state, utterance) = self.engine.start(conversation_id);
        self.store.save(&state).await?;

        Ok(StartConversationResult {
            conversation_id,
            stage: state.current_stage(),
            utterance,
            state,
        })
    }
}
