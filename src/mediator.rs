//! Reset mediation between callers and the reflection provider
//!
//! One admitted request makes exactly one provider call. Provider trouble of
//! any kind turns into a fixed fallback text; nothing is retried.

use crate::llm::{LlmMessage, LlmRequest, LlmResponse, LlmService};
use crate::rate_limit::{CallerKey, RateLimited, RateLimiter};
use crate::system_prompt::build_system_prompt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

/// Shortest accepted utterance, in characters after trimming
pub const MIN_TEXT_CHARS: usize = 3;
pub const REFLECTION_MAX_TOKENS: u32 = 250;
pub const REFLECTION_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(20);

/// Served when the provider answers with nothing usable
pub const EMPTY_REFLECTION_FALLBACK: &str = "\
- Whatever you are carrying right now is allowed to be here.
- You do not have to name it perfectly for it to matter.
- Feelings move like weather; this one will shift too.
- Rest your hands, soften your shoulders, and breathe slowly for one minute.";

/// Served when the provider call fails or times out
pub const PROVIDER_FAILURE_FALLBACK: &str = "\
- The system is resting for a moment, and you can rest with it.
- Nothing needs to be solved in this minute.
- Even a pause can be a small kindness to yourself.
- Take a slow breath in, let it out gently, and try again shortly.";

/// Rejections surfaced to the caller
#[derive(Debug, Error)]
pub enum MediatorError {
    #[error("Text input is required")]
    Validation,
    #[error(transparent)]
    RateLimited(#[from] RateLimited),
}

/// Where the reset text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflectionSource {
    Provider,
    EmptyFallback,
    ProviderFailure,
}

/// Reset text to return to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetOutcome {
    pub reset: String,
    pub source: ReflectionSource,
}

impl ResetOutcome {
    fn from_provider(response: &LlmResponse) -> Self {
        match response.non_empty_text() {
            Some(text) => Self {
                reset: text.to_string(),
                source: ReflectionSource::Provider,
            },
            None => {
                tracing::warn!("Provider returned empty reflection, using fallback");
                Self {
                    reset: EMPTY_REFLECTION_FALLBACK.to_string(),
                    source: ReflectionSource::EmptyFallback,
                }
            }
        }
    }

    fn provider_failure() -> Self {
        Self {
            reset: PROVIDER_FAILURE_FALLBACK.to_string(),
            source: ReflectionSource::ProviderFailure,
        }
    }

    /// Whether the caller should see a service-unavailable status
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.source == ReflectionSource::ProviderFailure
    }
}

pub struct ResetMediator {
    llm: Arc<dyn LlmService>,
    limiter: Arc<RateLimiter>,
    provider_timeout: Duration,
}

impl ResetMediator {
    #[must_use]
    pub fn new(
        llm: Arc<dyn LlmService>,
        limiter: Arc<RateLimiter>,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            llm,
            limiter,
            provider_timeout,
        }
    }

    #[must_use]
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Validate, admit, and forward one utterance.
    ///
    /// Validation runs first so rejected input never consumes a slot in the
    /// caller's window. An admitted request counts even if the provider
    /// call then fails.
    ///
    /// # Errors
    ///
    /// Invalid text and callers over their window are reported as a
    /// [`MediatorError`]. Provider failures are not errors; they become a
    /// fallback [`ResetOutcome`].
    pub async fn generate_reset(
        &self,
        caller: CallerKey,
        raw_text: &str,
    ) -> Result<ResetOutcome, MediatorError> {
        let text = validate_text(raw_text)?;

        if let Err(limited) = self.limiter.admit(caller).await {
            tracing::debug!(%caller, retry_after_s = limited.retry_after.as_secs(), "Reset request rate limited");
            return Err(limited.into());
        }

        let request = reflection_request(text);
        let outcome = match timeout(self.provider_timeout, self.llm.complete(&request)).await {
            Ok(Ok(response)) => ResetOutcome::from_provider(&response),
            Ok(Err(e)) => {
                tracing::error!(
                    %caller,
                    model = %self.llm.model_id(),
                    kind = ?e.kind,
                    transient = e.kind.is_transient(),
                    error = %e.message,
                    "Reflection provider failed"
                );
                ResetOutcome::provider_failure()
            }
            Err(_) => {
                tracing::error!(
                    %caller,
                    model = %self.llm.model_id(),
                    timeout_ms = %self.provider_timeout.as_millis(),
                    "Reflection provider timed out"
                );
                ResetOutcome::provider_failure()
            }
        };

        Ok(outcome)
    }
}

/// Trim and check the utterance; returns the trimmed text.
///
/// # Errors
///
/// Returns [`MediatorError::Validation`] when the trimmed text is shorter
/// than the minimum length.
pub fn validate_text(raw_text: &str) -> Result<&str, MediatorError> {
    let text = raw_text.trim();
    if text.chars().count() < MIN_TEXT_CHARS {
        return Err(MediatorError::Validation);
    }
    Ok(text)
}

fn reflection_request(text: &str) -> LlmRequest {
    LlmRequest {
        system: build_system_prompt(),
        messages: vec![LlmMessage::user(text)],
        max_tokens: Some(REFLECTION_MAX_TOKENS),
        temperature: Some(REFLECTION_TEMPERATURE),
    }
}
