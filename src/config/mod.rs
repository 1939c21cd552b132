//! Application configuration module
//!
//! Configuration is loaded from environment variables using the `config`
//! and `dotenvy` crates. Every key carries the `COLLOQUY` prefix and nested
//! values are separated by double underscores. Every section has defaults,
//! so an empty environment yields a runnable development setup.
//!
//! # Example
//!
//! ```no_run
//! use colloquy::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod chat;
mod error;
mod generation;
mod server;
mod storage;

pub use chat::ChatConfig;
pub use error::{ConfigError, ValidationError};
pub use generation::GenerationConfig;
pub use server::{Environment, ServerConfig};
pub use storage::StorageConfig;

use serde::Deserialize;

use crate::application::handlers::conversation::TurnSettings;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Conversation record storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Generation engine connection and default sampling
    #[serde(default)]
    pub generation: GenerationConfig,

    /// History window and token budget
    #[serde(default)]
    pub chat: ChatConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads `COLLOQUY__*` variables.
    ///
    /// - `COLLOQUY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `COLLOQUY__CHAT__MAX_HISTORY_MESSAGES=6` -> `chat.max_history_messages = 6`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value cannot be parsed into its field type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("COLLOQUY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.storage.validate()?;
        self.generation.validate()?;
        self.chat.validate()?;

        // The turn's own timeout fires before the HTTP layer's.
        if self.generation.timeout_secs >= self.server.request_timeout_secs {
            return Err(ValidationError::GenerationOutlastsRequest {
                generation_secs: self.generation.timeout_secs,
                request_secs: self.server.request_timeout_secs,
            });
        }
        Ok(())
    }

    /// Turn pipeline settings derived from the chat and generation sections
    pub fn turn_settings(&self) -> TurnSettings {
        TurnSettings {
            max_history_messages: self.chat.max_history_messages,
            max_context_tokens: self.chat.max_context_tokens,
            reserved_tokens: self.chat.reserved_tokens,
            generation_timeout: self.generation.timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const KEYS: &[&str] = &[
        "COLLOQUY__SERVER__PORT",
        "COLLOQUY__SERVER__ENVIRONMENT",
        "COLLOQUY__STORAGE__DATA_DIR",
        "COLLOQUY__GENERATION__API_KEY",
        "COLLOQUY__GENERATION__TIMEOUT_SECS",
        "COLLOQUY__CHAT__MAX_HISTORY_MESSAGES",
    ];

    fn clear_env() {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_load_with_empty_environment_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.data_dir, PathBuf::from("./data/conversations"));
        assert_eq!(config.chat.max_history_messages, 10);
        assert!(config.generation.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("COLLOQUY__SERVER__PORT", "3000");
        env::set_var("COLLOQUY__STORAGE__DATA_DIR", "/var/lib/colloquy");
        env::set_var("COLLOQUY__CHAT__MAX_HISTORY_MESSAGES", "6");
        env::set_var("COLLOQUY__GENERATION__API_KEY", "sk-local");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/colloquy"));
        assert_eq!(config.chat.max_history_messages, 6);
        assert_eq!(
            config.generation.api_key.as_ref().map(|k| k.expose_secret().as_str()),
            Some("sk-local")
        );
    }

    #[test]
    fn test_environment_override() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("COLLOQUY__SERVER__ENVIRONMENT", "staging");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.environment, Environment::Staging);
        assert!(config.server.json_logs());
    }

    #[test]
    fn test_generation_timeout_must_fit_inside_request_timeout() {
        let mut config = AppConfig::default();
        assert!(config.generation.timeout_secs < config.server.request_timeout_secs);

        config.server.request_timeout_secs = 30;
        config.generation.timeout_secs = 60;
        assert_eq!(
            config.validate(),
            Err(ValidationError::GenerationOutlastsRequest {
                generation_secs: 60,
                request_secs: 30
            })
        );

        config.generation.timeout_secs = 30;
        assert!(config.validate().is_err());

        config.generation.timeout_secs = 29;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_turn_settings_follow_sections() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("COLLOQUY__GENERATION__TIMEOUT_SECS", "15");
        let result = AppConfig::load();
        clear_env();

        let settings = result.unwrap().turn_settings();
        assert_eq!(settings.max_history_messages, 10);
        assert_eq!(settings.max_context_tokens, 512);
        assert_eq!(settings.reserved_tokens, 100);
        assert_eq!(settings.generation_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_invalid_chat_section_fails_validation() {
        let mut config = AppConfig::default();
        config.chat.reserved_tokens = 600;

        assert!(matches!(
            config.validate(),
            Err(ValidationError::ReservedExceedsContext { .. })
        ));
    }
}
