//! Configuration error types

use thiserror::Error;

use crate::domain::foundation::StageId;
use crate::domain::stage::MIN_STUCK_THRESHOLD;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid timeout for {0}")]
    InvalidTimeout(&'static str),

    #[error("Window {0} must hold at least one entry")]
    InvalidWindow(&'static str),

    #[error("Similarity threshold {name} must be in (0, 1], got {value}")]
    InvalidSimilarity { name: &'static str, value: f64 },

    #[error("Stuck threshold {threshold} below minimum {}{}", MIN_STUCK_THRESHOLD, stage_suffix(.stage))]
    StuckThresholdTooLow {
        stage: Option<StageId>,
        threshold: u32,
    },

    #[error("Opener word limit must be at least 1")]
    InvalidOpenerLength,

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}

fn stage_suffix(stage: &Option<StageId>) -> String {
    stage
        .map(|stage| format!(" for stage {}", stage))
        .unwrap_or_default()
}
