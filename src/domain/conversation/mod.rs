//! Conversation domain module.
//!
//! The conversation aggregate and the pure text operations applied around a
//! generation call: building the context window and extracting the reply.

mod context;
mod conversation;
mod extractor;
mod message;

pub use context::{BuiltContext, ContextWindowBuilder, TokenBudget, MIN_RETAINED_MESSAGES};
pub use conversation::{Conversation, ConversationMetadata};
pub use extractor::ResponseSanitizer;
pub use message::{Message, MessageRole, ModelConfig};
