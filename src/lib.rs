//! Colloquy - Conversational Chat Backend
//!
//! Persists multi-turn conversations and drives a text-completion engine one
//! turn at a time: record the user message, assemble a bounded prompt from
//! history, generate, clean the reply, record it.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
