//! Conversation Store Port - Durable CRUD over conversation aggregates.
//!
//! Implementations own the on-disk (or in-memory) representation and the
//! per-conversation write serialization. Every mutation of a conversation
//! goes through this port.
//!
//! # Concurrency contract
//!
//! - `append` on one id is a serialized read-modify-write: concurrent
//!   appends to the same conversation never lose a message
//! - Operations on different ids never block each other
//! - Readers observe either the pre- or post-write record, never a torn one

use async_trait::async_trait;

use crate::domain::conversation::{Conversation, MessageRole, ModelConfig};
use crate::domain::foundation::{ConversationId, DomainError, ErrorCode};

/// Errors that can occur during conversation storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    #[error("Conversation id already in use: {0}")]
    StorageConflict(ConversationId),

    #[error("Storage I/O error: {0}")]
    StorageIo(String),

    #[error("Corrupted record for conversation {id}: {reason}")]
    Corrupted { id: ConversationId, reason: String },
}

impl StoreError {
    pub fn io(message: impl Into<String>) -> Self {
        Self::StorageIo(message.into())
    }

    pub fn corrupted(id: ConversationId, reason: impl Into<String>) -> Self {
        Self::Corrupted {
            id,
            reason: reason.into(),
        }
    }

    /// Maps this error onto the shared error taxonomy.
    ///
    /// A corrupted record is an I/O class failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::ConversationNotFound(_) => ErrorCode::ConversationNotFound,
            StoreError::StorageConflict(_) => ErrorCode::StorageConflict,
            StoreError::StorageIo(_) | StoreError::Corrupted { .. } => ErrorCode::StorageIoError,
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        let code = err.code();
        let domain = DomainError::new(code, err.to_string());
        match err {
            StoreError::ConversationNotFound(id)
            | StoreError::StorageConflict(id)
            | StoreError::Corrupted { id, .. } => {
                domain.with_detail("conversation_id", id.to_string())
            }
            StoreError::StorageIo(_) => domain,
        }
    }
}

/// Port for persisting conversations, one durable record per id.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Allocates a fresh id and persists an empty conversation under it.
    ///
    /// # Errors
    /// Returns `StoreError::StorageIo` if the record cannot be written,
    /// including when id allocation collides twice in a row.
    async fn create(&self) -> Result<ConversationId, StoreError>;

    /// Loads the full aggregate.
    ///
    /// # Errors
    /// Returns `StoreError::ConversationNotFound` if no record exists and
    /// `StoreError::Corrupted` if the record is unreadable.
    async fn load(&self, id: ConversationId) -> Result<Conversation, StoreError>;

    /// Appends one message, stamping it with the current time.
    ///
    /// Overwrites the conversation's `modelConfig` when one is supplied.
    ///
    /// # Returns
    /// Zero-based position of the appended message.
    ///
    /// # Errors
    /// Returns `StoreError::ConversationNotFound` if `id` does not resolve.
    async fn append(
        &self,
        id: ConversationId,
        role: MessageRole,
        content: &str,
        model_config: Option<ModelConfig>,
    ) -> Result<usize, StoreError>;

    /// Enumerates all known conversation ids.
    ///
    /// No ordering guarantee beyond stability within a single call.
    async fn list_ids(&self) -> Result<Vec<ConversationId>, StoreError>;

    /// Removes the record irreversibly.
    ///
    /// # Returns
    /// `true` if the conversation existed, `false` otherwise.
    async fn delete(&self, id: ConversationId) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_not_found_code() {
        let err = StoreError::ConversationNotFound(ConversationId::new());
        assert_eq!(err.code(), ErrorCode::ConversationNotFound);
        assert!(err.to_string().contains("Conversation not found"));
    }

    #[test]
    fn corrupted_is_an_io_class_failure() {
        let err = StoreError::corrupted(ConversationId::new(), "truncated JSON");
        assert_eq!(err.code(), ErrorCode::StorageIoError);
        assert!(err.to_string().contains("truncated JSON"));
    }

    #[test]
    fn converts_to_domain_error_with_id_detail() {
        let id = ConversationId::new();
        let domain: DomainError = StoreError::ConversationNotFound(id).into();

        assert_eq!(domain.code(), ErrorCode::ConversationNotFound);
        assert_eq!(domain.details.get("conversation_id"), Some(&id.to_string()));
    }
}
