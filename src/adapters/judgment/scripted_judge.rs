//! Scripted semantic judge for tests and offline runs.
//!
//! Returns queued results in order, then a default verdict. An optional
//! delay lets tests exercise the gate's timeout.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::ports::{JudgeError, Judgment, JudgmentRequest, SemanticJudge};

#[derive(Debug, Clone)]
pub struct ScriptedJudge {
    queue: Arc<Mutex<VecDeque<Result<Judgment, JudgeError>>>>,
    default: Result<Judgment, JudgeError>,
    delay: Duration,
    requests: Arc<Mutex<Vec<JudgmentRequest>>>,
}

impl ScriptedJudge {
    /// Judge that answers yes unless scripted otherwise.
    pub fn approving() -> Self {
        Self::with_default(Ok(Judgment::yes("scripted")))
    }

    /// Judge that answers no unless scripted otherwise.
    pub fn rejecting() -> Self {
        Self::with_default(Ok(Judgment::no("scripted")))
    }

    /// Judge that always fails unless scripted otherwise.
    pub fn unavailable() -> Self {
        Self::with_default(Err(JudgeError::Unavailable("scripted outage".to_string())))
    }

    fn with_default(default: Result<Judgment, JudgeError>) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            default,
            delay: Duration::ZERO,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn then(self, result: Result<Judgment, JudgeError>) -> Self {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(result);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<JudgmentRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SemanticJudge for ScriptedJudge {
    async fn judge(&self, request: JudgmentRequest) -> Result<Judgment, JudgeError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        next.unwrap_or_else(|| self.default.clone())
    }
}
