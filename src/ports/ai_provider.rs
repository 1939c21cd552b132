//! AI Provider Port - Interface for the text-generation engine.
//!
//! The engine is a plain completion model: it receives a single prompt
//! string and continues it. Token counting is exposed alongside generation
//! so that callers can budget prompts with the engine's own measure.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoProvider;
//!
//! #[async_trait]
//! impl AIProvider for EchoProvider {
//!     async fn generate(&self, prompt: &str, _: &GenerationOptions) -> Result<String, AIError> {
//!         Ok(prompt.to_string())
//!     }
//!     fn count_tokens(&self, text: &str) -> u32 {
//!         text.split_whitespace().count() as u32
//!     }
//!     fn provider_info(&self) -> ProviderInfo {
//!         ProviderInfo::new("echo", "echo", 512)
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::conversation::ModelConfig;

/// Port for text-generation engine interactions.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Continues `prompt` using the given sampling options.
    ///
    /// Returns the raw generated text, excluding the prompt itself.
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, AIError>;

    /// Counts tokens in `text` as the engine would.
    ///
    /// Must be pure and side-effect free.
    fn count_tokens(&self, text: &str) -> u32;

    /// Get provider information (name, model, context size).
    fn provider_info(&self) -> ProviderInfo;
}

/// Sampling parameters for one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Softmax temperature; higher is more random.
    pub temperature: f64,
    /// Sample only among the `top_k` most likely tokens.
    pub top_k: u32,
    /// Nucleus sampling cutoff in (0, 1].
    pub top_p: f64,
    /// Penalty applied to tokens already present in the output.
    pub repetition_penalty: f64,
    /// Upper bound on generated tokens.
    pub max_new_tokens: u32,
}

impl GenerationOptions {
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_new_tokens(mut self, max_new_tokens: u32) -> Self {
        self.max_new_tokens = max_new_tokens;
        self
    }

    /// Option-name to value mapping recorded as a conversation's `modelConfig`.
    pub fn to_model_config(&self) -> ModelConfig {
        let mut config = ModelConfig::new();
        config.insert("temperature".to_string(), json!(self.temperature));
        config.insert("top_k".to_string(), json!(self.top_k));
        config.insert("top_p".to_string(), json!(self.top_p));
        config.insert(
            "repetition_penalty".to_string(),
            json!(self.repetition_penalty),
        );
        config.insert("max_new_tokens".to_string(), json!(self.max_new_tokens));
        config
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 50,
            top_p: 0.9,
            repetition_penalty: 1.2,
            max_new_tokens: 100,
        }
    }
}

/// Provider information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "http", "mock").
    pub name: String,
    /// Model identifier.
    pub model: String,
    /// Maximum context window size in tokens.
    pub max_context_tokens: u32,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>, max_context_tokens: u32) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            max_context_tokens,
        }
    }
}

/// Generation engine errors.
///
/// Every variant is a generation failure from the caller's point of view.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AIError {
    /// Engine overloaded or down.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Engine rejected the prompt or options.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// Engine produced nothing usable.
    #[error("generation produced an empty reply")]
    EmptyOutput,
}

impl AIError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Returns true if retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AIError::Unavailable { .. } | AIError::Network(_) | AIError::Timeout { .. }
        )
    }
}
