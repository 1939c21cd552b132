//! ListConversationsHandler - Query handler enumerating conversations.

use std::sync::Arc;

use crate::domain::foundation::{ConversationId, DomainError};
use crate::ports::ConversationStore;

/// Handler for listing conversations.
pub struct ListConversationsHandler {
    store: Arc<dyn ConversationStore>,
}

impl ListConversationsHandler {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self) -> Result<Vec<ConversationId>, DomainError> {
        self.store.list_ids().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to list conversations");
            DomainError::from(e)
        })
    }
}
