//! Common types for LLM interactions

/// LLM request
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub system: String,
    pub messages: Vec<LlmMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Message in conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmMessage {
    pub role: MessageRole,
    pub content: String,
}

impl LlmMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
}

impl MessageRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::User => "user",
        }
    }
}

/// LLM response
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    /// Assistant text, `None` when the provider returned no content
    pub text: Option<String>,
    pub finish_reason: Option<String>,
    pub usage: Usage,
}

impl LlmResponse {
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            finish_reason: Some("stop".to_string()),
            usage: Usage::default(),
        }
    }

    /// Text content, or `None` when missing or blank
    #[must_use]
    pub fn non_empty_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Usage statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
