//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - Conversation stores (filesystem, in-memory)
//! - `ai` - Generation engines (HTTP completion server, mock)
//! - `http` - axum routes exposing the application handlers

pub mod ai;
pub mod http;
pub mod storage;
