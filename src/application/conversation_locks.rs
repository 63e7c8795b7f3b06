//! Per-conversation serialization.
//!
//! Turns on the same conversation must run one at a time so that the
//! load, turn, save cycle never interleaves. Different conversations do not
//! contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::foundation::ConversationId;

#[derive(Debug, Clone, Default)]
pub struct ConversationLocks {
    locks: Arc<Mutex<HashMap<ConversationId, Arc<AsyncMutex<()>>>>>,
}

impl ConversationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to one conversation.
    pub async fn acquire(&self, conversation_id: ConversationId) -> ConversationGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(conversation_id).or_default().clone()
        };
        ConversationGuard {
            guard: Some(lock.lock_owned().await),
            locks: self.clone(),
        }
    }

    /// Drops entries no task is holding or waiting on.
    pub fn prune(&self) {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive access to one conversation.
///
/// Dropping the guard releases the lock and prunes idle entries, whatever
/// path the holder leaves by.
pub struct ConversationGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: ConversationLocks,
}

impl Drop for ConversationGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.prune();
    }
}
