//! DeleteConversationHandler - Command handler for removing a conversation.

use std::sync::Arc;

use crate::domain::foundation::{ConversationId, DomainError};
use crate::ports::ConversationStore;

/// Handler for deleting conversations.
pub struct DeleteConversationHandler {
    store: Arc<dyn ConversationStore>,
}

impl DeleteConversationHandler {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Deletes the conversation irreversibly.
    ///
    /// Returns `false` when there was nothing to delete.
    pub async fn handle(&self, conversation_id: ConversationId) -> Result<bool, DomainError> {
        self.store.delete(conversation_id).await.map_err(|e| {
            tracing::error!(conversation_id = %conversation_id, error = %e, "Failed to delete conversation");
            DomainError::from(e)
        })
    }
}
