//! Engine section validation
//!
//! `EngineConfig` itself lives with the engine; this module checks the
//! values that arrive from the environment before the registry is built.

use crate::domain::engine::EngineConfig;
use crate::domain::stage::MIN_STUCK_THRESHOLD;

use super::error::ValidationError;

impl EngineConfig {
    /// Validate engine tuning
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.judge_timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout("judge"));
        }
        if self.realizer_timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout("realizer"));
        }
        if self.history_window == 0 {
            return Err(ValidationError::InvalidWindow("history"));
        }
        if self.opener_window == 0 {
            return Err(ValidationError::InvalidWindow("opener"));
        }
        if self.opener_max_words == 0 {
            return Err(ValidationError::InvalidOpenerLength);
        }

        check_similarity("opener_similarity_threshold", self.opener_similarity_threshold)?;
        check_similarity("repeat_similarity_threshold", self.repeat_similarity_threshold)?;

        if self.default_stuck_threshold < MIN_STUCK_THRESHOLD {
            return Err(ValidationError::StuckThresholdTooLow {
                stage: None,
                threshold: self.default_stuck_threshold,
            });
        }

        // Sorted so the reported stage is stable across runs.
        let mut overrides: Vec<_> = self.stage_overrides.iter().collect();
        overrides.sort_by_key(|(stage, _)| **stage);
        for (stage, tuning) in overrides {
            if let Some(threshold) = tuning.stuck_threshold {
                if threshold < MIN_STUCK_THRESHOLD {
                    return Err(ValidationError::StuckThresholdTooLow {
                        stage: Some(*stage),
                        threshold,
                    });
                }
            }
        }

        Ok(())
    }
}

fn check_similarity(name: &'static str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidSimilarity { name, value })
    }
}
