//! Client side of the reset service
//!
//! Every outcome, including transport failure, ends up as text the
//! presentation layer can show as-is.

use crate::api::{ErrorResponse, ResetRequest, ResetResponse, RATE_LIMIT_MESSAGE};
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
pub const CLIENT_FALLBACK: &str = "The system paused for a moment. Please breathe and try again.";
pub const NEEDS_INPUT_MESSAGE: &str = "Please type something first.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What kind of text the caller is about to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    /// Provider reflection
    Reflection,
    /// Server-side fallback served with a non-2xx status
    ServerFallback,
    RateLimited,
    /// The server could not be reached or answered unexpectedly
    LocalFallback,
    /// Nothing was typed; no request was sent
    NeedsInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetDisplay {
    pub text: String,
    pub kind: DisplayKind,
}

impl ResetDisplay {
    fn new(text: impl Into<String>, kind: DisplayKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    fn local_fallback() -> Self {
        Self::new(CLIENT_FALLBACK, DisplayKind::LocalFallback)
    }
}

pub struct ResetClient {
    client: Client,
    endpoint: String,
}

impl ResetClient {
    /// Client for the reset route under `base_url`.
    ///
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/generate-reset", base_url.trim_end_matches('/')),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Ask the server for a reset; never fails.
    pub async fn request_reset(&self, text: &str) -> ResetDisplay {
        let text = text.trim();
        if text.is_empty() {
            return ResetDisplay::new(NEEDS_INPUT_MESSAGE, DisplayKind::NeedsInput);
        }

        let request = ResetRequest {
            text: Some(text.to_string()),
        };
        let response = match self.client.post(&self.endpoint).json(&request).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(endpoint = %self.endpoint, error = %e, "Reset request failed");
                return ResetDisplay::local_fallback();
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(%status, error = %e, "Failed to read reset response");
                return ResetDisplay::local_fallback();
            }
        };

        if status == StatusCode::TOO_MANY_REQUESTS {
            let message = serde_json::from_slice::<ErrorResponse>(&body)
                .map_or_else(|_| RATE_LIMIT_MESSAGE.to_string(), |e| e.error);
            return ResetDisplay::new(message, DisplayKind::RateLimited);
        }

        match serde_json::from_slice::<ResetResponse>(&body) {
            Ok(r) if status.is_success() => ResetDisplay::new(r.reset, DisplayKind::Reflection),
            Ok(r) => {
                tracing::warn!(%status, "Server answered with its fallback reset");
                ResetDisplay::new(r.reset, DisplayKind::ServerFallback)
            }
            Err(e) => {
                tracing::warn!(%status, error = %e, "Unexpected reset response");
                ResetDisplay::local_fallback()
            }
        }
    }
}
