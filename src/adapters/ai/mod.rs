//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `MockAIProvider` - Configurable mock for testing
//! - `AnthropicProvider` - Anthropic Messages API
//! - `FailoverAIProvider` - Wrapper with automatic failover between providers

mod anthropic_provider;
mod failover_provider;
mod mock_provider;

pub use anthropic_provider::{AnthropicConfig, AnthropicProvider};
pub use failover_provider::{FailoverAIProvider, NoFallback};
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
