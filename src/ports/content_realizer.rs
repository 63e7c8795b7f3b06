//! Content Realizer Port - short generated text such as reflection openers.
//!
//! Output is untrusted: the composer validates it after generation and
//! suppresses anything that fails.

use async_trait::async_trait;

use crate::domain::foundation::{ConversationId, StageId};
use crate::domain::stage::OpenerFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealizationRequest {
    pub conversation_id: ConversationId,
    pub stage: StageId,
    /// Instruction describing what to produce.
    pub directive: String,
    /// The human's own words; the only allowed source of content.
    pub source_text: String,
    /// BCP-47 language tag.
    pub language: String,
    pub max_words: usize,
    pub format: OpenerFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RealizeError {
    #[error("realizer unavailable: {0}")]
    Unavailable(String),

    #[error("empty realization")]
    Empty,
}

#[async_trait]
pub trait ContentRealizer: Send + Sync {
    async fn realize(&self, request: RealizationRequest) -> Result<String, RealizeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_realizer_is_object_safe() {
        fn _accepts_dyn(_realizer: &dyn ContentRealizer) {}
    }
}
