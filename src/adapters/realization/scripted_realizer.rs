//! Scripted content realizer for tests and offline runs.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::ports::{ContentRealizer, RealizationRequest, RealizeError};

/// Returns queued lines in order, then fails with `Empty`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRealizer {
    queue: Arc<Mutex<VecDeque<Result<String, RealizeError>>>>,
    delay: Duration,
    requests: Arc<Mutex<Vec<RealizationRequest>>>,
}

impl ScriptedRealizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(self, result: Result<String, RealizeError>) -> Self {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(result);
        self
    }

    pub fn then_line(self, line: impl Into<String>) -> Self {
        self.then(Ok(line.into()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<RealizationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ContentRealizer for ScriptedRealizer {
    async fn realize(&self, request: RealizationRequest) -> Result<String, RealizeError> {
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
        next.unwrap_or(Err(RealizeError::Empty))
    }
}
