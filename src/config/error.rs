//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid generation timeout")]
    InvalidGenerationTimeout,

    #[error("Generation base URL must start with http:// or https://")]
    InvalidBaseUrl,

    #[error("Invalid sampling option: {0}")]
    InvalidSamplingOption(&'static str),

    #[error("History window must hold at least one message")]
    InvalidHistoryWindow,

    #[error("Generation timeout ({generation_secs}s) must be shorter than the request timeout ({request_secs}s)")]
    GenerationOutlastsRequest { generation_secs: u64, request_secs: u64 },

    #[error("Reserved tokens ({reserved}) must be below max context tokens ({max})")]
    ReservedExceedsContext { reserved: u32, max: u32 },
}
