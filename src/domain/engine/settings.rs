//! Engine tuning.
//!
//! Loaded as the `engine` section of the application config; every field
//! has a default so an empty section is valid.

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::foundation::StageId;
use crate::domain::session::{DEFAULT_HISTORY_WINDOW, DEFAULT_OPENER_WINDOW};
use crate::domain::stage::{StageTuning, MIN_STUCK_THRESHOLD};

use super::decision::StrictnessProfile;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Profile used when a turn does not name one.
    pub default_profile: StrictnessProfile,
    pub judge_timeout_ms: u64,
    pub realizer_timeout_ms: u64,
    /// Recent exchanges kept for anti-repetition.
    pub history_window: usize,
    /// Recent openers kept for anti-repetition.
    pub opener_window: usize,
    pub opener_max_words: usize,
    /// Openers at or above this similarity to a recent one are suppressed.
    pub opener_similarity_threshold: f64,
    /// Adaptive prompts must stay below this similarity to recent prompts.
    pub repeat_similarity_threshold: f64,
    pub opener_on_advance: bool,
    pub opener_on_loop: bool,
    pub default_stuck_threshold: u32,
    pub stage_overrides: HashMap<StageId, StageTuning>,
    /// Added to the built-in interpretive-phrase blocklist.
    pub extra_interpretive_phrases: Vec<String>,
}

impl EngineConfig {
    pub fn judge_timeout(&self) -> Duration {
        Duration::from_millis(self.judge_timeout_ms)
    }

    pub fn realizer_timeout(&self) -> Duration {
        Duration::from_millis(self.realizer_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_profile: StrictnessProfile::Semantic,
            judge_timeout_ms: 4000,
            realizer_timeout_ms: 3000,
            history_window: DEFAULT_HISTORY_WINDOW,
            opener_window: DEFAULT_OPENER_WINDOW,
            opener_max_words: 12,
            opener_similarity_threshold: 0.6,
            repeat_similarity_threshold: 0.8,
            opener_on_advance: false,
            opener_on_loop: true,
            default_stuck_threshold: MIN_STUCK_THRESHOLD,
            stage_overrides: HashMap::new(),
            extra_interpretive_phrases: Vec::new(),
        }
    }
}
