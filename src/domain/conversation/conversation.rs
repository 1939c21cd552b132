//! Conversation aggregate - the unit of persistence.

use serde::{Deserialize, Serialize};

use super::message::{Message, MessageRole, ModelConfig};
use crate::domain::foundation::{ConversationId, Timestamp};

/// Derived bookkeeping stored alongside the messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMetadata {
    total_messages: usize,
    #[serde(default)]
    model_config: ModelConfig,
}

impl ConversationMetadata {
    pub fn total_messages(&self) -> usize {
        self.total_messages
    }

    pub fn model_config(&self) -> &ModelConfig {
        &self.model_config
    }
}

/// Conversation aggregate root.
///
/// # Invariants
///
/// - `messages` is append-only and kept in insertion order
/// - `metadata.totalMessages == messages.len()` after every mutation
/// - `updated_at` never decreases
///
/// The serialized form is the durable record: `id`, `createdAt`,
/// `updatedAt`, `messages`, `metadata { totalMessages, modelConfig }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    id: ConversationId,
    created_at: Timestamp,
    updated_at: Timestamp,
    messages: Vec<Message>,
    metadata: ConversationMetadata,
}

impl Conversation {
    /// Creates an empty conversation with the given id.
    pub fn new(id: ConversationId) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
            metadata: ConversationMetadata::default(),
        }
    }

    // === Accessors ===

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn metadata(&self) -> &ConversationMetadata {
        &self.metadata
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Consumes the aggregate, yielding its messages oldest first.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    // === Mutation ===

    /// Appends a message stamped with the current time.
    ///
    /// Overwrites `modelConfig` when `model_config` is `Some`. Returns the
    /// zero-based position of the new message.
    pub fn append(
        &mut self,
        role: MessageRole,
        content: impl Into<String>,
        model_config: Option<ModelConfig>,
    ) -> usize {
        let now = Timestamp::now().max_with(self.updated_at);
        self.messages.push(Message::new(role, content, now));
        self.updated_at = now;
        self.metadata.total_messages = self.messages.len();
        if let Some(config) = model_config {
            self.metadata.model_config = config;
        }
        self.messages.len() - 1
    }

    /// Checks the derived fields of a freshly deserialized record.
    ///
    /// Returns a description of the first inconsistency found.
    pub fn verify_integrity(&self) -> Result<(), String> {
        if self.metadata.total_messages != self.messages.len() {
            return Err(format!(
                "totalMessages is {} but {} messages are present",
                self.metadata.total_messages,
                self.messages.len()
            ));
        }
        if self.updated_at.is_before(&self.created_at) {
            return Err("updatedAt precedes createdAt".to_string());
        }
        Ok(())
    }
}
