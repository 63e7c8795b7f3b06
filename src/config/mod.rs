//! Application configuration module
//!
//! Type-safe configuration loading using the `config` and `dotenvy`
//! crates. Values come from an optional YAML file and from environment
//! variables with the `COACH_ENGINE` prefix, nested with `__`.
//!
//! # Example
//!
//! ```no_run
//! use coach_engine::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod engine;
mod error;
mod logging;
mod storage;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

use crate::domain::engine::EngineConfig;

/// Names the config file; defaults to `coach-engine` in the working directory.
pub const CONFIG_FILE_ENV: &str = "COACH_ENGINE_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "coach-engine";

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// offline setup: deterministic gating, in-memory sessions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Stage thresholds, timeouts and anti-repetition tuning
    #[serde(default)]
    pub engine: EngineConfig,

    /// AI provider configuration (Anthropic)
    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from the config file and environment
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads the YAML file named by `COACH_ENGINE_CONFIG`, if it exists
    /// 3. Overlays environment variables with `COACH_ENGINE` prefix
    ///
    /// # Environment Variable Format
    ///
    /// - `COACH_ENGINE__ENGINE__JUDGE_TIMEOUT_MS=2000` -> `engine.judge_timeout_ms`
    /// - `COACH_ENGINE__ENGINE__STAGE_OVERRIDES__EMOTIONS__MIN_ITEMS=3`
    /// - `COACH_ENGINE__AI__ANTHROPIC_API_KEY=...` -> `ai.anthropic_api_key`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is malformed or values cannot be
    /// parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let file = std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name(&file).required(false))
            .add_source(
                config::Environment::default()
                    .prefix("COACH_ENGINE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid value found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.engine.validate()?;
        self.ai.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
