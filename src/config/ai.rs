//! AI provider configuration
//!
//! Without an Anthropic key the engine runs with no judge and no realizer,
//! which forces the deterministic profile and fixed openers.

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use crate::adapters::ai::AnthropicConfig;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Anthropic API key
    pub anthropic_api_key: Option<Secret<String>>,

    /// Model used for judgments and opener realization
    pub model: String,

    /// Override for the API base URL
    pub base_url: Option<String>,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,

    /// Maximum retries on transient failures
    pub max_retries: u32,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if Anthropic is configured
    pub fn has_anthropic(&self) -> bool {
        self.anthropic_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Provider config when a key is present.
    pub fn anthropic(&self) -> Option<AnthropicConfig> {
        if !self.has_anthropic() {
            return None;
        }
        let key = self.anthropic_api_key.as_ref()?;
        let mut config = AnthropicConfig::new(key.expose_secret().trim())
            .with_model(self.model.clone())
            .with_timeout(self.timeout())
            .with_max_retries(self.max_retries);
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url.trim_end_matches('/'));
        }
        Some(config)
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("ai"));
        }
        if self.has_anthropic() && self.model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AI__MODEL"));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            model: default_model(),
            base_url: None,
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_retries() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.model, "claude-3-5-haiku-latest");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.max_retries, 1);
        assert!(!config.has_anthropic());
        assert!(config.anthropic().is_none());
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = AiConfig {
            anthropic_api_key: Some(Secret::new("   ".to_string())),
            ..Default::default()
        };
        assert!(!config.has_anthropic());
    }

    #[test]
    fn test_provider_config_from_key() {
        let config = AiConfig {
            anthropic_api_key: Some(Secret::new("sk-ant-xxx".to_string())),
            base_url: Some("http://localhost:9000/".to_string()),
            timeout_secs: 3,
            ..Default::default()
        };

        let provider = config.anthropic().unwrap();

        assert_eq!(provider.base_url, "http://localhost:9000");
        assert_eq!(provider.timeout, Duration::from_secs(3));
        assert_eq!(provider.model, "claude-3-5-haiku-latest");
    }

    #[test]
    fn test_key_is_redacted_in_debug() {
        let config = AiConfig {
            anthropic_api_key: Some(Secret::new("sk-ant-secret".to_string())),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("sk-ant-secret"));
    }

    #[test]
    fn test_validation() {
        assert!(AiConfig::default().validate().is_ok());

        let zero_timeout = AiConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(zero_timeout.validate().is_err());

        let no_model = AiConfig {
            anthropic_api_key: Some(Secret::new("sk-ant-xxx".to_string())),
            model: String::new(),
            ..Default::default()
        };
        assert_eq!(
            no_model.validate(),
            Err(ValidationError::MissingRequired("AI__MODEL"))
        );
    }
}
