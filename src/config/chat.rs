//! Turn pipeline configuration

use serde::Deserialize;

use super::error::ValidationError;

/// History and token budget settings for each turn
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Messages considered for context, including the new user message
    #[serde(default = "default_max_history_messages")]
    pub max_history_messages: usize,

    /// Total prompt budget in tokens
    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: u32,

    /// Tokens held back for the reply
    #[serde(default = "default_reserved_tokens")]
    pub reserved_tokens: u32,
}

impl ChatConfig {
    /// Validate chat configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_history_messages == 0 {
            return Err(ValidationError::InvalidHistoryWindow);
        }
        if self.reserved_tokens >= self.max_context_tokens {
            return Err(ValidationError::ReservedExceedsContext {
                reserved: self.reserved_tokens,
                max: self.max_context_tokens,
            });
        }
        Ok(())
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_history_messages: default_max_history_messages(),
            max_context_tokens: default_max_context_tokens(),
            reserved_tokens: default_reserved_tokens(),
        }
    }
}

fn default_max_history_messages() -> usize {
    10
}

fn default_max_context_tokens() -> u32 {
    512
}

fn default_reserved_tokens() -> u32 {
    100
}
