//! File-based Session Store Adapter
//!
//! Stores each conversation's session state as one YAML file on disk,
//! named by conversation id, so sessions can be inspected by hand.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::foundation::ConversationId;
use crate::domain::session::SessionState;
use crate::ports::{SessionStore, SessionStoreError};

/// File-based storage for session state
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    base_path: PathBuf,
}

impl FileSessionStore {
    /// Create a new file store rooted at `base_path`
    ///
    /// # Example
    /// ```ignore
    /// let store = FileSessionStore::new("./data/sessions");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn state_file_path(&self, conversation_id: ConversationId) -> PathBuf {
        self.base_path.join(format!("{}.yaml", conversation_id))
    }

    async fn ensure_dir(&self) -> Result<(), SessionStoreError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| SessionStoreError::IoError(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn save(&self, state: &SessionState) -> Result<(), SessionStoreError> {
        self.ensure_dir().await?;

        let yaml = serde_yaml::to_string(state)
            .map_err(|e| SessionStoreError::SerializationFailed(e.to_string()))?;

        // Write then rename; readers never see a partial file.
        let file_path = self.state_file_path(state.conversation_id());
        let tmp_path = file_path.with_extension("yaml.tmp");
        fs::write(&tmp_path, yaml)
            .await
            .map_err(|e| SessionStoreError::IoError(e.to_string()))?;
        fs::rename(&tmp_path, &file_path)
            .await
            .map_err(|e| SessionStoreError::IoError(e.to_string()))?;

        tracing::debug!(
            conversation_id = %state.conversation_id(),
            path = %file_path.display(),
            "Session saved"
        );
        Ok(())
    }

    async fn load(&self, conversation_id: ConversationId) -> Result<SessionState, SessionStoreError> {
        let file_path = self.state_file_path(conversation_id);

        let yaml = match fs::read_to_string(&file_path).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SessionStoreError::NotFound(conversation_id))
            }
            Err(e) => return Err(SessionStoreError::IoError(e.to_string())),
        };

        serde_yaml::from_str(&yaml)
            .map_err(|e| SessionStoreError::DeserializationFailed(e.to_string()))
    }

    async fn exists(&self, conversation_id: ConversationId) -> Result<bool, SessionStoreError> {
        match fs::metadata(self.state_file_path(conversation_id)).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SessionStoreError::IoError(e.to_string())),
        }
    }

    async fn delete(&self, conversation_id: ConversationId) -> Result<(), SessionStoreError> {
        match fs::remove_file(self.state_file_path(conversation_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionStoreError::IoError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::engine::{EngineConfig, TurnInput, TurnOrchestrator, StrictnessProfile};
    use tempfile::TempDir;

    #[tokio::test]
    async fn save_and_load_round_trips_progress() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path().join("sessions"));
        let engine = TurnOrchestrator::new(&EngineConfig::default(), None, None).unwrap();
        let (state, _) = engine.start(ConversationId::new());
        let out = engine
            .process_turn(
                TurnInput::new(state, "my manager", "en")
                    .with_profile(StrictnessProfile::Deterministic),
            )
            .await;

        store.save(&out.state).await.unwrap();
        let loaded = store.load(out.state.conversation_id()).await.unwrap();

        assert_eq!(loaded, out.state);
        assert_eq!(loaded.collected().text("topic"), Some("my manager"));
    }

    #[tokio::test]
    async fn load_missing_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());

        let result = store.load(ConversationId::new()).await;

        assert!(matches!(result, Err(SessionStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn corrupt_file_fails_to_deserialize() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());
        let id = ConversationId::new();
        std::fs::write(temp_dir.path().join(format!("{}.yaml", id)), "current_stage: [").unwrap();

        let result = store.load(id).await;

        assert!(matches!(result, Err(SessionStoreError::DeserializationFailed(_))));
    }

    #[tokio::test]
    async fn exists_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());
        let state = SessionState::new(ConversationId::new());
        let id = state.conversation_id();

        assert!(!store.exists(id).await.unwrap());
        store.save(&state).await.unwrap();
        assert!(store.exists(id).await.unwrap());

        store.delete(id).await.unwrap();
        assert!(!store.exists(id).await.unwrap());

        // Deleting again is fine.
        store.delete(id).await.unwrap();
    }

    #[tokio::test]
    async fn save_overwrites_previous_version() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());
        let mut state = SessionState::new(ConversationId::new());
        store.save(&state).await.unwrap();

        state.record_exchange(state.current_stage(), "hi", "hello");
        store.save(&state).await.unwrap();

        let loaded = store.load(state.conversation_id()).await.unwrap();
        assert_eq!(loaded.turn_count(), 1);
    }
}
