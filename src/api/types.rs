//! API request and response types

use serde::{Deserialize, Serialize};

pub const HEALTH_STATUS: &str = "MindMinute backend running";
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests. Please pause for a moment.";

/// Request for a reset reflection
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetRequest {
    /// Missing text is treated as empty
    #[serde(default)]
    pub text: Option<String>,
}

/// Reflection bullets, or a fallback with the same shape
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub reset: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: HEALTH_STATUS.to_string(),
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
