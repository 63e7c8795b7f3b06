//! Failover AI Provider - Wrapper that provides automatic failover between providers.
//!
//! When the primary provider fails with a transient error (rate limit,
//! unavailable, timeout), the request is retried once on the fallback
//! provider if one is configured.
//!
//! # Example
//!
//! ```ignore
//! let provider = FailoverAIProvider::new(AnthropicProvider::new(config))
//!     .with_fallback(MockAIProvider::new().with_response("..."));
//! ```

use async_trait::async_trait;

use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse, ProviderInfo};

/// AI provider wrapper with automatic failover support.
pub struct FailoverAIProvider<P: AIProvider, F: AIProvider = NoFallback> {
    primary: P,
    fallback: Option<F>,
}

/// Marker type for when no fallback is configured.
pub struct NoFallback;

#[async_trait]
impl AIProvider for NoFallback {
    async fn complete(&self, _: CompletionRequest) -> Result<CompletionResponse, AIError> {
        Err(AIError::unavailable("no fallback provider configured"))
    }

    fn estimate_tokens(&self, _: &str) -> u32 {
        0
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("none", "none", 0)
    }
}

impl<P: AIProvider> FailoverAIProvider<P, NoFallback> {
    /// Creates a new failover provider with only a primary provider.
    pub fn new(primary: P) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    /// Adds a fallback provider.
    pub fn with_fallback<F: AIProvider>(self, fallback: F) -> FailoverAIProvider<P, F> {
        FailoverAIProvider {
            primary: self.primary,
            fallback: Some(fallback),
        }
    }
}

#[async_trait]
impl<P: AIProvider + 'static, F: AIProvider + 'static> AIProvider for FailoverAIProvider<P, F> {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let err = match self.primary.complete(request.clone()).await {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        match &self.fallback {
            Some(fallback) if err.is_retryable() => {
                tracing::warn!(
                    conversation_id = %request.metadata.conversation_id,
                    purpose = request.metadata.purpose,
                    primary = %self.primary.provider_info().name,
                    fallback = %fallback.provider_info().name,
                    error = %err,
                    "AI provider failover"
                );
                fallback.complete(request).await
            }
            _ => Err(err),
        }
    }

    fn estimate_tokens(&self, text: &str) -> u32 {
        self.primary.estimate_tokens(text)
    }

    fn provider_info(&self) -> ProviderInfo {
        self.primary.provider_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::foundation::ConversationId;
    use crate::ports::{MessageRole, RequestMetadata};

    fn make_request() -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new(ConversationId::new(), "realize"))
            .with_message(MessageRole::User, "anger, shame")
    }

    #[tokio::test]
    async fn primary_success_skips_fallback() {
        let fallback = MockAIProvider::new().with_response("Fallback response");
        let provider = FailoverAIProvider::new(MockAIProvider::new().with_response("Hi there!"))
            .with_fallback(fallback.clone());

        let response = provider.complete(make_request()).await.unwrap();

        assert_eq!(response.content, "Hi there!");
        assert_eq!(fallback.call_count(), 0);
    }

    #[tokio::test]
    async fn primary_rate_limited_uses_fallback() {
        let primary =
            MockAIProvider::new().with_error(MockError::RateLimited { retry_after_secs: 30 });
        let provider = FailoverAIProvider::new(primary)
            .with_fallback(MockAIProvider::new().with_response("Fallback response"));

        let response = provider.complete(make_request()).await.unwrap();

        assert_eq!(response.content, "Fallback response");
    }

    #[tokio::test]
    async fn non_retryable_error_not_retried() {
        let fallback = MockAIProvider::new().with_response("Fallback response");
        let provider =
            FailoverAIProvider::new(MockAIProvider::new().with_error(MockError::AuthenticationFailed))
                .with_fallback(fallback.clone());

        let result = provider.complete(make_request()).await;

        assert!(matches!(result, Err(AIError::AuthenticationFailed)));
        assert_eq!(fallback.call_count(), 0);
    }

    #[tokio::test]
    async fn no_fallback_configured_returns_primary_error() {
        let primary = MockAIProvider::new().with_error(MockError::Unavailable {
            message: "Service down".to_string(),
        });

        let result = FailoverAIProvider::new(primary).complete(make_request()).await;

        assert!(matches!(result, Err(AIError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn fallback_failure_is_returned() {
        let primary =
            MockAIProvider::new().with_error(MockError::RateLimited { retry_after_secs: 30 });
        let provider = FailoverAIProvider::new(primary)
            .with_fallback(MockAIProvider::new().with_error(MockError::AuthenticationFailed));

        let result = provider.complete(make_request()).await;

        assert!(matches!(result, Err(AIError::AuthenticationFailed)));
    }
}
