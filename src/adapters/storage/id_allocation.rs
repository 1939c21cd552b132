//! Fresh-id allocation shared by the conversation stores.

use std::future::Future;

use crate::domain::foundation::ConversationId;
use crate::ports::StoreError;

/// Runs `attempt` with a fresh id, retrying once on `StorageConflict`.
///
/// A second conflict surfaces as `StorageIo`.
pub(crate) async fn allocate_with_retry<F, Fut>(mut attempt: F) -> Result<ConversationId, StoreError>
where
    F: FnMut(ConversationId) -> Fut,
    Fut: Future<Output = Result<ConversationId, StoreError>>,
{
    match attempt(ConversationId::new()).await {
        Err(StoreError::StorageConflict(first)) => {
            tracing::warn!(conversation_id = %first, "Conversation id collision, retrying with a fresh id");
            match attempt(ConversationId::new()).await {
                Err(StoreError::StorageConflict(second)) => Err(StoreError::io(format!(
                    "id allocation collided twice ({} then {})",
                    first, second
                ))),
                other => other,
            }
        }
        other => other,
    }
}
