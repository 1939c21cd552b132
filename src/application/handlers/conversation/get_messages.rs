//! GetMessagesHandler - Query handler for a conversation's message history.

use std::sync::Arc;

use crate::domain::conversation::Message;
use crate::domain::foundation::{ConversationId, DomainError};
use crate::ports::{ConversationStore, StoreError};

/// Query to get the messages of a conversation.
#[derive(Debug, Clone)]
pub struct GetMessagesQuery {
    pub conversation_id: ConversationId,
    /// Return only the most recent `limit` messages.
    pub limit: Option<usize>,
}

impl GetMessagesQuery {
    pub fn all(conversation_id: ConversationId) -> Self {
        Self {
            conversation_id,
            limit: None,
        }
    }
}

/// Handler for getting messages.
pub struct GetMessagesHandler {
    store: Arc<dyn ConversationStore>,
}

impl GetMessagesHandler {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Returns messages oldest first.
    ///
    /// An unknown conversation yields an empty list, not an error.
    pub async fn handle(&self, query: GetMessagesQuery) -> Result<Vec<Message>, DomainError> {
        let messages = match self.store.load(query.conversation_id).await {
            Ok(conversation) => conversation.into_messages(),
            Err(StoreError::ConversationNotFound(_)) => return Ok(Vec::new()),
            Err(e) => {
                tracing::error!(
                    conversation_id = %query.conversation_id,
                    error = %e,
                    "Failed to load messages"
                );
                return Err(e.into());
            }
        };

        Ok(match query.limit {
            Some(limit) if limit < messages.len() => {
                messages[messages.len() - limit..].to_vec()
            }
            _ => messages,
        })
    }
}
