//! Server configuration from the process environment

use crate::llm::LlmConfig;
use crate::mediator::DEFAULT_PROVIDER_TIMEOUT;
use crate::rate_limit::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;
pub const MAX_REQUEST_BYTES: usize = 16 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub rate_limit_per_window: usize,
    pub rate_window: Duration,
    pub provider_timeout: Duration,
    pub max_request_bytes: usize,
    pub llm: LlmConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            rate_limit_per_window: DEFAULT_MAX_REQUESTS,
            rate_window: DEFAULT_WINDOW,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            max_request_bytes: MAX_REQUEST_BYTES,
            llm: LlmConfig::default(),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparseable values fall back to defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
            value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
        }

        let defaults = Self::default();
        Self {
            port: parsed(lookup("PORT"), defaults.port),
            rate_limit_per_window: parsed(
                lookup("MINDMINUTE_RATE_LIMIT_PER_MIN"),
                defaults.rate_limit_per_window,
            )
            .max(1),
            rate_window: Duration::from_secs(
                parsed(
                    lookup("MINDMINUTE_RATE_WINDOW_SECS"),
                    defaults.rate_window.as_secs(),
                )
                .max(1),
            ),
            provider_timeout: Duration::from_secs(
                parsed(
                    lookup("MINDMINUTE_PROVIDER_TIMEOUT_SECS"),
                    defaults.provider_timeout.as_secs(),
                )
                .max(1),
            ),
            max_request_bytes: defaults.max_request_bytes,
            llm: LlmConfig::from_lookup(&lookup),
        }
    }
}
