//! Session State Entity
//!
//! Tracks one conversation's progress through the stage sequence. The state
//! is a plain value: callers load it, hand it to a turn, and persist what
//! comes back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{ConversationId, StageId};

use super::collected_data::CollectedData;
use super::recent_window::RecentWindow;

/// Default number of recent exchanges remembered for loop detection.
pub const DEFAULT_HISTORY_WINDOW: usize = 6;

/// Default number of recent reflection openers remembered for anti-repetition.
pub const DEFAULT_OPENER_WINDOW: usize = 5;

/// One human utterance and the system reply it received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    /// Stage the human was answering.
    pub stage: StageId,
    pub human: String,
    pub system: String,
}

/// Attempted stage change that would break forward-only progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal stage transition from {from:?} to {to:?}")]
pub struct IllegalTransition {
    pub from: StageId,
    pub to: StageId,
}

/// Complete mutable state of one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    conversation_id: ConversationId,
    current_stage: StageId,
    collected: CollectedData,
    stage_loops: BTreeMap<StageId, u32>,
    turn_count: u32,
    recent_openers: RecentWindow<String>,
    recent_exchanges: RecentWindow<Exchange>,
    concluded: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SessionState {
    /// Creates a fresh session at the first stage with default window sizes.
    pub fn new(conversation_id: ConversationId) -> Self {
        Self::with_windows(conversation_id, DEFAULT_OPENER_WINDOW, DEFAULT_HISTORY_WINDOW)
    }

    pub fn with_windows(
        conversation_id: ConversationId,
        opener_window: usize,
        history_window: usize,
    ) -> Self {
        let now = Utc::now();
        Self {
            conversation_id,
            current_stage: StageId::first(),
            collected: CollectedData::new(),
            stage_loops: BTreeMap::new(),
            turn_count: 0,
            recent_openers: RecentWindow::new(opener_window),
            recent_exchanges: RecentWindow::new(history_window),
            concluded: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    pub fn current_stage(&self) -> StageId {
        self.current_stage
    }

    pub fn collected(&self) -> &CollectedData {
        &self.collected
    }

    /// Number of LOOP decisions since the stage was entered.
    pub fn loop_count(&self, stage: StageId) -> u32 {
        self.stage_loops.get(&stage).copied().unwrap_or(0)
    }

    /// Number of human turns processed so far.
    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn is_concluded(&self) -> bool {
        self.concluded
    }

    pub fn recent_openers(&self) -> &RecentWindow<String> {
        &self.recent_openers
    }

    pub fn recent_exchanges(&self) -> &RecentWindow<Exchange> {
        &self.recent_exchanges
    }

    /// System utterances recently emitted while the human was in `stage`.
    pub fn recent_system_utterances(&self, stage: StageId) -> Vec<&str> {
        self.recent_exchanges
            .iter()
            .filter(|e| e.stage == stage)
            .map(|e| e.system.as_str())
            .collect()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Clears everything collected and returns to the first stage.
    ///
    /// Only an explicit, user-initiated reset may call this.
    pub fn reset(&mut self) {
        self.current_stage = StageId::first();
        self.collected.clear();
        self.stage_loops.clear();
        self.turn_count = 0;
        self.recent_openers.clear();
        self.recent_exchanges.clear();
        self.concluded = false;
        self.touch();
    }

    pub(crate) fn collected_mut(&mut self) -> &mut CollectedData {
        &mut self.collected
    }

    /// Moves to the immediately following stage and resets its loop counter.
    pub(crate) fn advance_to(&mut self, next: StageId) -> Result<(), IllegalTransition> {
        if self.current_stage.next() != Some(next) {
            return Err(IllegalTransition {
                from: self.current_stage,
                to: next,
            });
        }
        self.stage_loops.remove(&self.current_stage);
        self.stage_loops.remove(&next);
        self.current_stage = next;
        self.touch();
        Ok(())
    }

    pub(crate) fn record_loop(&mut self) -> u32 {
        let counter = self.stage_loops.entry(self.current_stage).or_insert(0);
        *counter += 1;
        let count = *counter;
        self.touch();
        count
    }

    pub(crate) fn conclude(&mut self) {
        self.concluded = true;
        self.touch();
    }

    pub(crate) fn record_exchange(&mut self, stage: StageId, human: &str, system: &str) {
        self.turn_count += 1;
        self.recent_exchanges.push(Exchange {
            stage,
            human: human.to_string(),
            system: system.to_string(),
        });
        self.touch();
    }

    pub(crate) fn remember_opener(&mut self, opener: &str) {
        self.recent_openers.push(opener.to_string());
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
