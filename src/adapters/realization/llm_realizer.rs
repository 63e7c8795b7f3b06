//! Content realizer backed by an `AIProvider`.
//!
//! Produces one short line. No validation happens here; the composer's
//! opener policy checks every realization before it is spoken.

use async_trait::async_trait;
use std::sync::Arc;

use crate::adapters::judgment::reply::clean_line;
use crate::ports::{
    AIProvider, CompletionRequest, ContentRealizer, MessageRole, RealizationRequest, RealizeError,
    RequestMetadata,
};

const SYSTEM_PROMPT: &str = "You write one short line for a coaching conversation. \
Use only the speaker's own words. Never interpret, judge, or add anything. \
Reply with the line only.";

pub struct LlmContentRealizer {
    provider: Arc<dyn AIProvider>,
}

impl LlmContentRealizer {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self { provider }
    }

    fn build_request(request: &RealizationRequest) -> CompletionRequest {
        let prompt = format!(
            "{}\nAt most {} words. Language: {}.\nSpeaker said:\n\"\"\"\n{}\n\"\"\"",
            request.directive, request.max_words, request.language, request.source_text
        );
        CompletionRequest::new(
            RequestMetadata::new(request.conversation_id, "realize").for_stage(request.stage),
        )
        .with_system_prompt(SYSTEM_PROMPT)
        .with_message(MessageRole::User, prompt)
        .with_max_tokens(60)
        .with_temperature(0.3)
    }
}

#[async_trait]
impl ContentRealizer for LlmContentRealizer {
    async fn realize(&self, request: RealizationRequest) -> Result<String, RealizeError> {
        let response = self
            .provider
            .complete(Self::build_request(&request))
            .await
            .map_err(|e| RealizeError::Unavailable(e.to_string()))?;

        let line = clean_line(&response.content);
        if line.is_empty() {
            return Err(RealizeError::Empty);
        }
        Ok(line)
    }
}
