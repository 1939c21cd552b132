//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, timestamps, error codes)
//! - `conversation` - Conversation aggregate, context window, reply extraction

pub mod conversation;
pub mod foundation;
