//! HTTP Text Generator - AIProvider backed by a remote completion server.
//!
//! Speaks the OpenAI-compatible text-completions shape that common local
//! inference servers expose: `POST {base_url}/completions` with a single
//! `prompt`, reading the continuation from `choices[0].text`.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpGeneratorConfig::new("http://localhost:8000/v1")
//!     .with_model("openai-community/gpt2")
//!     .with_api_key("sk-...");
//!
//! let provider = HttpTextGenerator::new(config)?;
//! ```
//!
//! # Token counting
//!
//! `count_tokens` approximates at four characters per token. It is used
//! only for budgeting; the server applies its own tokenizer and truncation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{AIError, AIProvider, GenerationOptions, ProviderInfo};

/// Characters per token used by the approximate counter.
const CHARS_PER_TOKEN: usize = 4;

/// Configuration for the HTTP text generator.
#[derive(Debug, Clone)]
pub struct HttpGeneratorConfig {
    /// Base URL of the completion server (e.g. `http://localhost:8000/v1`).
    pub base_url: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// Optional bearer token.
    api_key: Option<Secret<String>>,
    /// Request timeout.
    pub timeout: Duration,
    /// Context size reported in provider info.
    pub max_context_tokens: u32,
}

impl HttpGeneratorConfig {
    /// Creates a new configuration for the given server.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: "openai-community/gpt2".to_string(),
            api_key: None,
            timeout: Duration::from_secs(60),
            max_context_tokens: 1024,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(api_key.into()));
        self
    }

    /// Sets the bearer token from an already-wrapped secret.
    pub fn with_api_key_secret(mut self, api_key: Option<Secret<String>>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the context size reported in provider info.
    pub fn with_max_context_tokens(mut self, max_context_tokens: u32) -> Self {
        self.max_context_tokens = max_context_tokens;
        self
    }
}

/// Completion-server provider implementation.
pub struct HttpTextGenerator {
    config: HttpGeneratorConfig,
    client: Client,
}

impl HttpTextGenerator {
    /// Creates a new generator with the given configuration.
    ///
    /// # Errors
    /// Returns `AIError::InvalidRequest` if the HTTP client cannot be built.
    pub fn new(config: HttpGeneratorConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::invalid_request(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    /// Builds the completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn to_request<'a>(&'a self, prompt: &'a str, options: &GenerationOptions) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.config.model,
            prompt,
            max_tokens: options.max_new_tokens,
            temperature: options.temperature,
            top_k: options.top_k,
            top_p: options.top_p,
            repetition_penalty: options.repetition_penalty,
        }
    }

    /// Maps a non-success status to an error.
    fn status_error(status: StatusCode, body: &str) -> AIError {
        match status.as_u16() {
            400 | 422 => AIError::invalid_request(format!("Server rejected request: {}", body)),
            429 => AIError::unavailable(format!("Rate limited: {}", body)),
            500..=599 => AIError::unavailable(format!("Server error {}: {}", status, body)),
            _ => AIError::network(format!("Unexpected status {}: {}", status, body)),
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> AIError {
        if e.is_timeout() {
            AIError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            }
        } else if e.is_connect() {
            AIError::network(format!("Connection failed: {}", e))
        } else {
            AIError::network(e.to_string())
        }
    }
}

#[async_trait]
impl AIProvider for HttpTextGenerator {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, AIError> {
        let mut request = self
            .client
            .post(self.completions_url())
            .json(&self.to_request(prompt, options));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, &body));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| AIError::parse("No choices in response"))
    }

    fn count_tokens(&self, text: &str) -> u32 {
        let chars = text.chars().count();
        chars.div_ceil(CHARS_PER_TOKEN) as u32
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("http", &self.config.model, self.config.max_context_tokens)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Wire types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f64,
    top_k: u32,
    top_p: f64,
    repetition_penalty: f64,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}
