//! Text generation engine configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::ports::GenerationOptions;

/// Generation engine configuration
///
/// Connection settings for the completion server plus the default
/// sampling options applied when a request supplies none.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Completion server base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional bearer token for the completion server
    pub api_key: Option<Secret<String>>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Context size of the model in tokens
    #[serde(default = "default_model_context_tokens")]
    pub model_context_tokens: u32,

    /// Upper bound on a single generation call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f64,

    #[serde(default = "default_repetition_penalty")]
    pub repetition_penalty: f64,

    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
}

impl GenerationConfig {
    /// Get the generation timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Sampling options used when a request supplies none
    pub fn default_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            top_k: self.top_k,
            top_p: self.top_p,
            repetition_penalty: self.repetition_penalty,
            max_new_tokens: self.max_new_tokens,
        }
    }

    /// Validate generation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("generation.model"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 600 {
            return Err(ValidationError::InvalidGenerationTimeout);
        }
        if self.temperature <= 0.0 || self.temperature > 2.0 {
            return Err(ValidationError::InvalidSamplingOption("temperature"));
        }
        if self.top_k == 0 {
            return Err(ValidationError::InvalidSamplingOption("top_k"));
        }
        if self.top_p <= 0.0 || self.top_p > 1.0 {
            return Err(ValidationError::InvalidSamplingOption("top_p"));
        }
        if self.repetition_penalty <= 0.0 {
            return Err(ValidationError::InvalidSamplingOption("repetition_penalty"));
        }
        if self.max_new_tokens == 0 {
            return Err(ValidationError::InvalidSamplingOption("max_new_tokens"));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            model_context_tokens: default_model_context_tokens(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            repetition_penalty: default_repetition_penalty(),
            max_new_tokens: default_max_new_tokens(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/v1".to_string()
}

fn default_model() -> String {
    "openai-community/gpt2".to_string()
}

fn default_model_context_tokens() -> u32 {
    1024
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f64 {
    0.7
}

fn default_top_k() -> u32 {
    50
}

fn default_top_p() -> f64 {
    0.9
}

fn default_repetition_penalty() -> f64 {
    1.2
}

fn default_max_new_tokens() -> u32 {
    100
}
