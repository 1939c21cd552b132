//! HTTP DTOs for conversation endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::{Message, MessageRole};
use crate::domain::foundation::ErrorCode;
use crate::ports::GenerationOptions;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request body for sending a message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// The user's message; validated by the turn handler.
    #[serde(default)]
    pub message: String,
    /// Per-request overrides of the default sampling options.
    #[serde(default)]
    pub options: Option<GenerationOptionsDto>,
}

/// Partial sampling options; absent fields keep the server defaults.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptionsDto {
    pub temperature: Option<f64>,
    pub top_k: Option<u32>,
    pub top_p: Option<f64>,
    pub repetition_penalty: Option<f64>,
    pub max_new_tokens: Option<u32>,
}

impl GenerationOptionsDto {
    /// Overlays the supplied fields onto `defaults`.
    pub fn apply_to(self, defaults: GenerationOptions) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature.unwrap_or(defaults.temperature),
            top_k: self.top_k.unwrap_or(defaults.top_k),
            top_p: self.top_p.unwrap_or(defaults.top_p),
            repetition_penalty: self.repetition_penalty.unwrap_or(defaults.repetition_penalty),
            max_new_tokens: self.max_new_tokens.unwrap_or(defaults.max_new_tokens),
        }
    }
}

/// Query parameters for listing messages.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MessagesParams {
    /// Return only the most recent `limit` messages.
    pub limit: Option<usize>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for a created conversation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationResponse {
    pub success: bool,
    pub conversation_id: String,
}

/// Response listing conversation ids.
#[derive(Debug, Clone, Serialize)]
pub struct ListConversationsResponse {
    pub success: bool,
    pub conversations: Vec<String>,
}

/// Response carrying a conversation's messages.
#[derive(Debug, Clone, Serialize)]
pub struct MessagesResponse {
    pub success: bool,
    pub messages: Vec<MessageView>,
}

/// View of a message for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub role: MessageRole,
    pub content: String,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

impl From<Message> for MessageView {
    fn from(message: Message) -> Self {
        Self {
            role: message.role,
            timestamp: message.timestamp.to_rfc3339(),
            content: message.content,
        }
    }
}

/// Response for a delete request.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteConversationResponse {
    /// Whether a conversation was removed.
    pub success: bool,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub provider: String,
    pub model: String,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: ErrorCode,
}

impl ErrorResponse {
    pub fn new(error_code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            error_code,
        }
    }
}
