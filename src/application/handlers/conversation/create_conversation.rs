//! CreateConversationHandler - Command handler for starting a conversation.

use std::sync::Arc;

use crate::domain::foundation::{ConversationId, DomainError};
use crate::ports::ConversationStore;

/// Handler for creating conversations.
pub struct CreateConversationHandler {
    store: Arc<dyn ConversationStore>,
}

impl CreateConversationHandler {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Persists an empty conversation and returns its id.
    pub async fn handle(&self) -> Result<ConversationId, DomainError> {
        self.store.create().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to create conversation");
            DomainError::from(e)
        })
    }
}
