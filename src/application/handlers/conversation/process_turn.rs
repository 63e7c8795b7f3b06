//! ProcessTurnHandler - Runs one human turn against a stored session.
//!
//! Holds the conversation lock across load, turn and save so concurrent
//! turns on one conversation are applied in order.

use std::sync::Arc;

use crate::application::ConversationLocks;
use crate::domain::engine::{StrictnessProfile, TurnInput, TurnOrchestrator, TurnOutput};
use crate::domain::foundation::{ConversationId, StageId};
use crate::ports::SessionStore;

use super::errors::ConversationError;

#[derive(Debug, Clone)]
pub struct ProcessTurnCommand {
    pub conversation_id: ConversationId,
    pub utterance: String,
    /// BCP-47 tag forwarded to collaborators.
    pub language: String,
    pub profile: Option<StrictnessProfile>,
    pub requested_stage: Option<StageId>,
}

impl ProcessTurnCommand {
    pub fn new(
        conversation_id: ConversationId,
        utterance: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id,
            utterance: utterance.into(),
            language: language.into(),
            profile: None,
            requested_stage: None,
        }
    }
}

pub struct ProcessTurnHandler {
    engine: Arc<TurnOrchestrator>,
    store: Arc<dyn SessionStore>,
    locks: ConversationLocks,
}

impl ProcessTurnHandler {
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

    pub async fn handle(&self, cmd: ProcessTurnCommand) -> Result<TurnOutput, ConversationError> {
        let _guard = self.locks.acquire(cmd.conversation_id).await;

        let state = self.store.load(cmd.conversation_id).await?;
        let input = TurnInput {
            state,
            utterance: cmd.utterance,
            language: cmd.language,
            profile: cmd.profile,
            requested_stage: cmd.requested_stage,
        };
        let output = self.engine.process_turn(input).await;
        self.store.save(&output.state).await?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::domain::engine::EngineConfig;

    fn setup() -> (Arc<TurnOrchestrator>, Arc<InMemorySessionStore>, ProcessTurnHandler) {
        let (engine, store, handler, _) = setup_with_locks();
        (engine, store, handler)
    }

    fn setup_with_locks() -> (
        Arc<TurnOrchestrator>,
        Arc<InMemorySessionStore>,
        ProcessTurnHandler,
        ConversationLocks,
    ) {
        let config = EngineConfig {
            default_profile: StrictnessProfile::Deterministic,
            ..EngineConfig::default()
        };
        let engine = Arc::new(TurnOrchestrator::new(&config, None, None).unwrap());
        let store = Arc::new(InMemorySessionStore::new());
        let locks = ConversationLocks::new();
        let handler = ProcessTurnHandler::new(engine.clone(), store.clone(), locks.clone());
        (engine, store, handler, locks)
    }

    #[tokio::test]
    async fn turn_is_persisted() {
        let (engine, store, handler) = setup();
        let (state, _) = engine.start(ConversationId::new());
        let id = state.conversation_id();
        store.save(&state).await.unwrap();

        let output = handler
            .handle(ProcessTurnCommand::new(id, "my manager", "en"))
            .await
            .unwrap();

        assert_eq!(output.stage, StageId::Event);
        let stored = store.load(id).await.unwrap();
        assert_eq!(stored.current_stage(), StageId::Event);
        assert_eq!(stored.turn_count(), 1);
    }

    #[tokio::test]
    async fn unknown_conversation_is_not_found() {
        let (_, _, handler) = setup();

        let result = handler
            .handle(ProcessTurnCommand::new(ConversationId::new(), "hi", "en"))
            .await;

        assert!(matches!(result, Err(ConversationError::NotFound(_))));
    }

    #[tokio::test]
    async fn failed_turns_leave_no_lock_behind() {
        let (_, _, handler, locks) = setup_with_locks();

        for _ in 0..3 {
            let result = handler
                .handle(ProcessTurnCommand::new(ConversationId::new(), "hi", "en"))
                .await;
            assert!(result.is_err());
        }

        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn concurrent_turns_are_serialized() {
        let (engine, store, handler) = setup();
        let (mut state, _) = engine.start(ConversationId::new());
        state.advance_to(StageId::Event).unwrap();
        state.advance_to(StageId::Emotions).unwrap();
        let id = state.conversation_id();
        store.save(&state).await.unwrap();
        let handler = Arc::new(handler);

        let turns = ["anger", "shame", "fear"].map(|item| {
            let handler = handler.clone();
            tokio::spawn(async move {
                handler
                    .handle(ProcessTurnCommand::new(id, item, "en"))
                    .await
                    .unwrap()
            })
        });
        for turn in turns {
            turn.await.unwrap();
        }

        let stored = store.load(id).await.unwrap();
        assert_eq!(stored.turn_count(), 3);
        assert_eq!(stored.collected().list_len("emotions"), 3);
    }
}
