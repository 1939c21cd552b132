//! Message value type for conversations.
//!
//! Messages are immutable records of user/assistant exchanges within a
//! conversation. Each message has a role, content, and the timestamp at which
//! the store appended it.

use crate::domain::foundation::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Last-applied generation parameters, keyed by option name.
///
/// Ordered so that persisted records are byte-stable across rewrites.
pub type ModelConfig = BTreeMap<String, serde_json::Value>;

/// Role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User input.
    User,
    /// Generated reply.
    Assistant,
}

impl MessageRole {
    /// Canonical capitalized name used when rendering prompts.
    pub fn label(&self) -> &'static str {
        match self {
            MessageRole::User => "User",
            MessageRole::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An immutable message within a conversation.
///
/// Owned exclusively by its conversation. The timestamp is assigned by the
/// store at append time and is never caller supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: Timestamp,
}

impl Message {
    pub(crate) fn new(role: MessageRole, content: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }

    /// Renders this message as a `"<RoleLabel>: <content>"` prompt line.
    pub fn render(&self) -> String {
        format!("{}: {}", self.role.label(), self.content)
    }
}
