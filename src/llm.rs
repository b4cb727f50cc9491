//! LLM provider abstraction
//!
//! The reset mediator talks to exactly one chat-completions provider. The
//! trait keeps the mediator independent of the wire format so tests can
//! swap in a mock.

mod config;
mod error;
mod openai;
mod types;

#[cfg(test)]
pub mod testing;

pub use config::{build_service, LlmConfig};
pub use error::{LlmError, LlmErrorKind};
pub use openai::{OpenAICompatService, GROQ_CHAT_COMPLETIONS_URL};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    ///
    /// # Errors
    ///
    /// Transport, status, and decoding failures as an [`LlmError`].
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    #[must_use]
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    finish_reason = response.finish_reason.as_deref().unwrap_or("none"),
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    error = %e.message,
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Stand-in used when no provider credentials are configured.
///
/// Every call fails, so the mediator serves its failure fallback instead of
/// refusing to start.
pub struct UnconfiguredService {
    model_id: String,
}

impl UnconfiguredService {
    #[must_use]
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
        }
    }
}

#[async_trait]
impl LlmService for UnconfiguredService {
    async fn complete(&self, _request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        Err(LlmError::not_configured(
            "no API key configured for the reflection provider",
        ))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
