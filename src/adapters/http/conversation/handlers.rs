//! HTTP handlers for conversation endpoints.
//!
//! These handlers connect Axum routes to application layer operations.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::handlers::conversation::{
    CreateConversationHandler, DeleteConversationHandler, GetMessagesHandler, GetMessagesQuery,
    ListConversationsHandler, TurnCommand, TurnOrchestrator, TurnOutcome, TurnSettings,
};
use crate::domain::foundation::{ConversationId, DomainError, ErrorCode};
use crate::ports::{AIProvider, ConversationStore, GenerationOptions};

use super::dto::{
    CreateConversationResponse, DeleteConversationResponse, ErrorResponse, HealthResponse,
    ListConversationsResponse, MessageView, MessagesParams, MessagesResponse, SendMessageRequest,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state for conversation handlers.
#[derive(Clone)]
pub struct ConversationAppState {
    pub create: Arc<CreateConversationHandler>,
    pub get_messages: Arc<GetMessagesHandler>,
    pub list: Arc<ListConversationsHandler>,
    pub delete: Arc<DeleteConversationHandler>,
    pub turns: Arc<TurnOrchestrator>,
    pub provider: Arc<dyn AIProvider>,
    /// Sampling options used when a request supplies none.
    pub default_options: GenerationOptions,
}

impl ConversationAppState {
    /// Wires every handler to the given store and provider.
    pub fn new(
        store: Arc<dyn ConversationStore>,
        provider: Arc<dyn AIProvider>,
        settings: TurnSettings,
        default_options: GenerationOptions,
    ) -> Self {
        Self {
            create: Arc::new(CreateConversationHandler::new(store.clone())),
            get_messages: Arc::new(GetMessagesHandler::new(store.clone())),
            list: Arc::new(ListConversationsHandler::new(store.clone())),
            delete: Arc::new(DeleteConversationHandler::new(store.clone())),
            turns: Arc::new(TurnOrchestrator::new(store, provider.clone(), settings)),
            provider,
            default_options,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// POST /api/conversations
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/conversations - Start an empty conversation.
pub async fn create_conversation(
    State(state): State<ConversationAppState>,
) -> Result<impl IntoResponse, ConversationApiError> {
    let id = state.create.handle().await?;

    Ok((
        StatusCode::OK,
        Json(CreateConversationResponse {
            success: true,
            conversation_id: id.to_string(),
        }),
    ))
}

// ════════════════════════════════════════════════════════════════════════════════
// GET /api/conversations
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/conversations - List conversation ids.
pub async fn list_conversations(
    State(state): State<ConversationAppState>,
) -> Result<impl IntoResponse, ConversationApiError> {
    let ids = state.list.handle().await?;

    Ok((
        StatusCode::OK,
        Json(ListConversationsResponse {
            success: true,
            conversations: ids.iter().map(ToString::to_string).collect(),
        }),
    ))
}

// ════════════════════════════════════════════════════════════════════════════════
// GET /api/conversations/:id/messages
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/conversations/:id/messages - Get message history.
///
/// # Query Parameters
/// - `limit`: Return only the most recent N messages
///
/// Unknown or malformed ids yield an empty list.
pub async fn get_messages(
    State(state): State<ConversationAppState>,
    Path(conversation_id): Path<String>,
    Query(params): Query<MessagesParams>,
) -> Result<impl IntoResponse, ConversationApiError> {
    let messages = match ConversationId::from_str(&conversation_id) {
        Ok(conversation_id) => {
            state
                .get_messages
                .handle(GetMessagesQuery {
                    conversation_id,
                    limit: params.limit,
                })
                .await?
        }
        Err(_) => Vec::new(),
    };

    Ok((
        StatusCode::OK,
        Json(MessagesResponse {
            success: true,
            messages: messages.into_iter().map(MessageView::from).collect(),
        }),
    ))
}

// ════════════════════════════════════════════════════════════════════════════════
// POST /api/conversations/:id/messages
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/conversations/:id/messages - Run one turn.
///
/// # Errors
/// - 400 Bad Request: Empty message
/// - 404 Not Found: Conversation not found
/// - 502 Bad Gateway: Generation failed (the user message is kept)
/// - 500 Internal Server Error: Storage failure
pub async fn send_message(
    State(state): State<ConversationAppState>,
    Path(conversation_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Response, ConversationApiError> {
    let conversation_id = ConversationId::from_str(&conversation_id).map_err(|_| {
        ConversationApiError::NotFound(format!("Conversation not found: {}", conversation_id))
    })?;

    let options = request
        .options
        .map(|o| o.apply_to(state.default_options))
        .unwrap_or(state.default_options);

    let outcome = state
        .turns
        .process_turn(TurnCommand {
            conversation_id,
            message: request.message,
            options,
        })
        .await;

    Ok((outcome_status(&outcome), Json(outcome)).into_response())
}

fn outcome_status(outcome: &TurnOutcome) -> StatusCode {
    match outcome.error_code {
        None => StatusCode::OK,
        Some(code) => status_for(code),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// DELETE /api/conversations/:id
// ════════════════════════════════════════════════════════════════════════════════

/// DELETE /api/conversations/:id - Delete a conversation.
///
/// Responds `{"success": false}` when there was nothing to delete.
pub async fn delete_conversation(
    State(state): State<ConversationAppState>,
    Path(conversation_id): Path<String>,
) -> Result<impl IntoResponse, ConversationApiError> {
    let deleted = match ConversationId::from_str(&conversation_id) {
        Ok(id) => state.delete.handle(id).await?,
        Err(_) => false,
    };

    Ok((StatusCode::OK, Json(DeleteConversationResponse { success: deleted })))
}

// ════════════════════════════════════════════════════════════════════════════════
// GET /api/health
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/health - Liveness plus the configured generation engine.
pub async fn health(State(state): State<ConversationAppState>) -> impl IntoResponse {
    let info = state.provider.provider_info();
    Json(HealthResponse {
        status: "healthy".to_string(),
        provider: info.name,
        model: info.model,
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorCode::ConversationNotFound => StatusCode::NOT_FOUND,
        ErrorCode::GenerationFailure => StatusCode::BAD_GATEWAY,
        ErrorCode::StorageConflict | ErrorCode::StorageIoError | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// API error type that converts domain errors to HTTP responses.
#[derive(Debug)]
pub enum ConversationApiError {
    NotFound(String),
    Domain(DomainError),
}

impl From<DomainError> for ConversationApiError {
    fn from(err: DomainError) -> Self {
        ConversationApiError::Domain(err)
    }
}

impl IntoResponse for ConversationApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ConversationApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new(ErrorCode::ConversationNotFound, msg),
            ),
            ConversationApiError::Domain(err) => {
                let status = status_for(err.code());
                if status.is_server_error() {
                    tracing::error!("Internal error: {}", err);
                    (
                        status,
                        ErrorResponse::new(err.code(), "An internal error occurred"),
                    )
                } else {
                    (status, ErrorResponse::new(err.code(), err.message))
                }
            }
        };

        (status, Json(error)).into_response()
    }
}
