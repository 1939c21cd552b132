//! HTTP adapter for conversation endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{ConversationApiError, ConversationAppState};
pub use routes::{conversation_router, conversation_routes};
