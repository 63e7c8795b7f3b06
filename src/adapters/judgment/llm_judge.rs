//! Semantic judge backed by an `AIProvider`.
//!
//! The model is asked one yes/no question and must answer with a JSON
//! object `{"verdict": bool, "rationale": string}`. Anything else is a
//! malformed judgment, which the gate treats like an outage.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, JudgeError, Judgment, JudgmentRequest, MessageRole,
    RequestMetadata, SemanticJudge,
};

use super::reply::extract_json_object;

const SYSTEM_PROMPT: &str = "You evaluate one answer in a coaching conversation. \
Answer the question about the text with a single JSON object: \
{\"verdict\": true or false, \"rationale\": \"one short sentence\"}. \
Judge only what the text says. Do not give advice.";

#[derive(Debug, Deserialize)]
struct VerdictReply {
    verdict: bool,
    #[serde(default)]
    rationale: String,
}

pub struct LlmSemanticJudge {
    provider: Arc<dyn AIProvider>,
}

impl LlmSemanticJudge {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self { provider }
    }

    fn build_request(request: &JudgmentRequest) -> CompletionRequest {
        let prompt = format!(
            "Question: {}\nLanguage: {}\nText:\n\"\"\"\n{}\n\"\"\"",
            request.question, request.language, request.text
        );
        CompletionRequest::new(
            RequestMetadata::new(request.conversation_id, "judge").for_stage(request.stage),
        )
        .with_system_prompt(SYSTEM_PROMPT)
        .with_message(MessageRole::User, prompt)
        .with_max_tokens(150)
        .with_temperature(0.0)
    }

    fn parse(reply: &str) -> Result<Judgment, JudgeError> {
        let json = extract_json_object(reply)
            .ok_or_else(|| JudgeError::Malformed(format!("no JSON object in reply: {}", reply)))?;
        let parsed: VerdictReply =
            serde_json::from_str(json).map_err(|e| JudgeError::Malformed(e.to_string()))?;
        Ok(Judgment {
            verdict: parsed.verdict,
            rationale: parsed.rationale,
        })
    }
}

impl From<AIError> for JudgeError {
    fn from(err: AIError) -> Self {
        match err {
            AIError::Parse(message) => JudgeError::Malformed(message),
            other => JudgeError::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
impl SemanticJudge for LlmSemanticJudge {
    async fn judge(&self, request: JudgmentRequest) -> Result<Judgment, JudgeError> {
        let response = self.provider.complete(Self::build_request(&request)).await?;
        let judgment = Self::parse(&response.content)?;
        tracing::debug!(
            conversation_id = %request.conversation_id,
            stage = %request.stage,
            verdict = judgment.verdict,
            tokens = response.usage.total_tokens,
            "Semantic judgment"
        );
        Ok(judgment)
    }
}
