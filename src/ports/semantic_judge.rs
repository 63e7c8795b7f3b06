//! Semantic Judge Port - yes/no judgment over free text.
//!
//! Used by semantic gates to tell a concrete, narratable account from a
//! vague or general one. Every call is bounded by a timeout in the gate and
//! has a deterministic fallback, so implementations may fail freely.

use async_trait::async_trait;

use crate::domain::foundation::{ConversationId, StageId};

/// A yes/no question about a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgmentRequest {
    pub conversation_id: ConversationId,
    pub stage: StageId,
    pub question: String,
    pub text: String,
    /// BCP-47 language tag of the text.
    pub language: String,
}

/// Verdict with a short explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgment {
    pub verdict: bool,
    pub rationale: String,
}

impl Judgment {
    pub fn yes(rationale: impl Into<String>) -> Self {
        Self {
            verdict: true,
            rationale: rationale.into(),
        }
    }

    pub fn no(rationale: impl Into<String>) -> Self {
        Self {
            verdict: false,
            rationale: rationale.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JudgeError {
    #[error("judge unavailable: {0}")]
    Unavailable(String),

    #[error("malformed judgment: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait SemanticJudge: Send + Sync {
    async fn judge(&self, request: JudgmentRequest) -> Result<Judgment, JudgeError>;
}
