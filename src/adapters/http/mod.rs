//! HTTP adapters - REST API implementations.

mod app;
pub mod conversation;

// Re-export key types for convenience
pub use app::build_app;
pub use conversation::{conversation_router, ConversationAppState};
