//! `OpenAI`-compatible chat completions provider
//!
//! Groq, `OpenAI` and most hosted inference gateways speak this wire format,
//! so one implementation covers them; only the endpoint differs.

use super::types::{LlmRequest, LlmResponse, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default endpoint: Groq's `OpenAI`-compatible chat API
pub const GROQ_CHAT_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Chat completions service for `OpenAI`-compatible providers
pub struct OpenAICompatService {
    client: Client,
    api_key: String,
    base_url: String,
    model_id: String,
}

impl OpenAICompatService {
    /// # Errors
    ///
    /// Returns a `NotConfigured` error if the HTTP client cannot be built.
    pub fn new(
        api_key: String,
        model_id: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::not_configured(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url,
            model_id,
        })
    }

    fn translate_request(&self, request: &LlmRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if !request.system.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: Some(request.system.clone()),
            });
        }

        messages.extend(request.messages.iter().map(|m| ChatMessage {
            role: m.role.as_str().to_string(),
            content: Some(m.content.clone()),
        }));

        ChatRequest {
            model: self.model_id.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        }
    }

    fn normalize_response(resp: ChatResponse) -> Result<LlmResponse, LlmError> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::malformed("No choices in response"))?;

        let usage = resp.usage.map_or_else(Usage::default, |u| Usage {
            input_tokens: u64::from(u.prompt_tokens),
            output_tokens: u64::from(u.completion_tokens),
        });

        Ok(LlmResponse {
            text: choice.message.content,
            finish_reason: choice.finish_reason,
            usage,
        })
    }

    fn classify_status(status: reqwest::StatusCode, message: &str) -> LlmError {
        match status.as_u16() {
            401 | 403 => LlmError::auth(format!("Authentication failed: {message}")),
            429 => LlmError::rate_limit(format!("Rate limit exceeded: {message}")),
            400 => LlmError::invalid_request(format!("Invalid request: {message}")),
            500..=599 => LlmError::server_error(format!("Server error: {message}")),
            _ => LlmError::malformed(format!("HTTP {status}: {message}")),
        }
    }
}

#[async_trait]
impl LlmService for OpenAICompatService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let chat_request = self.translate_request(request);

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::timeout(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ChatErrorResponse>(&body)
                .map_or(body, |e| e.error.message);
            return Err(Self::classify_status(status, &message));
        }

        let chat_response: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::malformed(format!("Failed to parse response: {e}")))?;

        Self::normalize_response(chat_response)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// Chat completions wire types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatErrorResponse {
    error: ChatError,
}

#[derive(Debug, Deserialize)]
struct ChatError {
    message: String,
}
