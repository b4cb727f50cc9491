//! Mock LLM services for testing

use super::{LlmError, LlmRequest, LlmResponse, LlmService};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Mock LLM service that returns queued responses
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    /// Response used once the queue is empty
    fallback: Mutex<Option<String>>,
    delay: Option<Duration>,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmService {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(None),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every call with the same text
    pub fn always(text: impl Into<String>) -> Self {
        let mock = Self::new();
        *mock.fallback.lock().unwrap() = Some(text.into());
        mock
    }

    /// Sleep before answering (for timeout tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for MockLlmService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let queued = self.responses.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| match self.fallback.lock().unwrap().as_ref() {
            Some(text) => Ok(LlmResponse::from_text(text.clone())),
            None => Err(LlmError::network("No mock response queued")),
        })
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}
