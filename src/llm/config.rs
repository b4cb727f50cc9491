//! Provider configuration loaded from the environment

use super::{LlmService, LoggingService, OpenAICompatService, UnconfiguredService, GROQ_CHAT_COMPLETIONS_URL};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Configuration for the reflection provider
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    /// Full chat completions URL
    pub base_url: String,
    /// HTTP client timeout
    pub request_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: GROQ_CHAT_COMPLETIONS_URL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl LlmConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            api_key: non_empty("MINDMINUTE_API_KEY").or_else(|| non_empty("GROQ_API_KEY")),
            model: non_empty("MINDMINUTE_MODEL").unwrap_or(defaults.model),
            base_url: non_empty("MINDMINUTE_LLM_BASE_URL").unwrap_or(defaults.base_url),
            request_timeout: defaults.request_timeout,
        }
    }
}

/// Build the provider service, wrapped with request logging.
///
/// Without an API key the returned service fails every call.
#[must_use]
pub fn build_service(config: &LlmConfig) -> Arc<dyn LlmService> {
    let Some(api_key) = config.api_key.clone() else {
        tracing::warn!(
            model = %config.model,
            "No provider API key configured. Set GROQ_API_KEY; resets will use the fallback text."
        );
        return Arc::new(UnconfiguredService::new(config.model.clone()));
    };

    match OpenAICompatService::new(
        api_key,
        config.model.clone(),
        config.base_url.clone(),
        config.request_timeout,
    ) {
        Ok(service) => Arc::new(LoggingService::new(Arc::new(service))),
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize provider client");
            Arc::new(UnconfiguredService::new(config.model.clone()))
        }
    }
}
