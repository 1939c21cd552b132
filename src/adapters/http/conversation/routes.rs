//! Axum routes for conversation endpoints.
//!
//! Defines the routing table for all conversation-related HTTP endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    create_conversation, delete_conversation, get_messages, health, list_conversations,
    send_message, ConversationAppState,
};

/// Creates routes for conversation endpoints.
///
/// REST Endpoints:
/// - POST /api/conversations - Create a conversation
/// - GET /api/conversations - List conversation ids
/// - GET /api/conversations/:conversation_id/messages - Get message history
/// - POST /api/conversations/:conversation_id/messages - Run one turn
/// - DELETE /api/conversations/:conversation_id - Delete a conversation
/// - GET /api/health - Health check
pub fn conversation_routes() -> Router<ConversationAppState> {
    Router::new()
        .route("/conversations", post(create_conversation).get(list_conversations))
        .route(
            "/conversations/:conversation_id/messages",
            get(get_messages).post(send_message),
        )
        .route(
            "/conversations/:conversation_id",
            axum::routing::delete(delete_conversation),
        )
        .route("/health", get(health))
}

/// Combined router with all conversation routes under /api.
pub fn conversation_router() -> Router<ConversationAppState> {
    Router::new().nest("/api", conversation_routes())
}
