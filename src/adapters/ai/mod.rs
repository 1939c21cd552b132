//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `MockAIProvider` - Configurable mock for testing
//! - `HttpTextGenerator` - Remote OpenAI-compatible completion server

mod http_provider;
mod mock_provider;

pub use http_provider::{HttpGeneratorConfig, HttpTextGenerator};
pub use mock_provider::{word_count, MockAIProvider, MockCall, MockResponse, DEFAULT_MOCK_REPLY};
