//! Storage Adapters
//!
//! Implementations of the ConversationStore port.
//!
//! ## Available Adapters
//!
//! - **FileConversationStore** - One JSON record per conversation on disk
//! - **InMemoryConversationStore** - Conversations in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileConversationStore, InMemoryConversationStore};
//!
//! // Production: file-based storage
//! let store = FileConversationStore::open("./data/conversations").await?;
//!
//! // Testing: in-memory storage
//! let store = InMemoryConversationStore::new();
//! ```

mod file_conversation_store;
mod id_allocation;
mod in_memory_conversation_store;
mod keyed_locks;

pub use file_conversation_store::FileConversationStore;
pub use in_memory_conversation_store::InMemoryConversationStore;
pub use keyed_locks::{KeyedGuard, KeyedLocks};
