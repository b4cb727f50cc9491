//! LLM error types

use thiserror::Error;

/// LLM error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
}

impl LlmError {
    #[must_use]
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Timeout, message)
    }

    #[must_use]
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::RateLimit, message)
    }

    #[must_use]
    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::ServerError, message)
    }

    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Auth, message)
    }

    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::InvalidRequest, message)
    }

    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Malformed, message)
    }

    #[must_use]
    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::NotConfigured, message)
    }
}

/// Error classification
///
/// The mediator never retries, so this only feeds logging: transient
/// failures are expected noise, the rest point at configuration problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Connection refused, reset, DNS
    Network,
    /// Provider did not answer in time
    Timeout,
    /// Provider-side quota (429)
    RateLimit,
    /// Provider 5xx
    ServerError,
    /// Rejected credentials (401, 403)
    Auth,
    /// Provider rejected the request shape (400)
    InvalidRequest,
    /// Response body did not match the expected shape
    Malformed,
    /// No credentials at startup
    NotConfigured,
}

impl LlmErrorKind {
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::Network | Self::Timeout | Self::RateLimit | Self::ServerError
        )
    }
}
