//! In-Memory Conversation Store Adapter
//!
//! Keeps conversations in a map guarded by an async `RwLock`.
//! Useful for testing and ephemeral runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::id_allocation::allocate_with_retry;
use crate::domain::conversation::{Conversation, MessageRole, ModelConfig};
use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationStore, StoreError};

/// In-memory storage for conversations
///
/// Each mutation runs under the map's write lock, which makes the
/// read-modify-write of `append` atomic. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    conversations: Arc<RwLock<HashMap<ConversationId, Conversation>>>,
}

impl InMemoryConversationStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored conversations
    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.conversations.write().await.clear();
    }

    async fn try_create(&self, id: ConversationId) -> Result<ConversationId, StoreError> {
        let mut conversations = self.conversations.write().await;
        if conversations.contains_key(&id) {
            return Err(StoreError::StorageConflict(id));
        }
        conversations.insert(id, Conversation::new(id));
        Ok(id)
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create(&self) -> Result<ConversationId, StoreError> {
        let id = allocate_with_retry(|id| self.try_create(id)).await?;
        tracing::info!(conversation_id = %id, "Conversation created");
        Ok(id)
    }

    async fn load(&self, id: ConversationId) -> Result<Conversation, StoreError> {
        self.conversations
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::ConversationNotFound(id))
    }

    async fn append(
        &self,
        id: ConversationId,
        role: MessageRole,
        content: &str,
        model_config: Option<ModelConfig>,
    ) -> Result<usize, StoreError> {
        let mut conversations = self.conversations.write().await;
        let conversation = conversations
            .get_mut(&id)
            .ok_or(StoreError::ConversationNotFound(id))?;

        Ok(conversation.append(role, content, model_config))
    }

    async fn list_ids(&self) -> Result<Vec<ConversationId>, StoreError> {
        let mut ids: Vec<_> = self.conversations.read().await.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    async fn delete(&self, id: ConversationId) -> Result<bool, StoreError> {
        let removed = self.conversations.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(conversation_id = %id, "Conversation deleted");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_and_load_empty_conversation() {
        let store = InMemoryConversationStore::new();

        let id = store.create().await.unwrap();
        let conversation = store.load(id).await.unwrap();

        assert_eq!(conversation.id(), id);
        assert!(conversation.messages().is_empty());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn try_create_detects_collision() {
        let store = InMemoryConversationStore::new();
        let id = store.create().await.unwrap();

        assert!(matches!(
            store.try_create(id).await,
            Err(StoreError::StorageConflict(_))
        ));
    }

    #[tokio::test]
    async fn append_returns_positions_in_order() {
        let store = InMemoryConversationStore::new();
        let id = store.create().await.unwrap();

        assert_eq!(store.append(id, MessageRole::User, "a", None).await.unwrap(), 0);
        assert_eq!(store.append(id, MessageRole::Assistant, "b", None).await.unwrap(), 1);

        let conversation = store.load(id).await.unwrap();
        assert_eq!(conversation.messages()[1].content, "b");
    }

    #[tokio::test]
    async fn append_to_unknown_id_is_not_found() {
        let store = InMemoryConversationStore::new();

        let result = store
            .append(ConversationId::new(), MessageRole::User, "a", None)
            .await;

        assert!(matches!(result, Err(StoreError::ConversationNotFound(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let store = InMemoryConversationStore::new();
        let id = store.create().await.unwrap();

        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
        assert!(store.list_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryConversationStore::new();
        let clone = store.clone();

        let id = store.create().await.unwrap();

        assert_eq!(clone.list_ids().await.unwrap(), vec![id]);
        clone.clear().await;
        assert_eq!(store.len().await, 0);
    }
}
