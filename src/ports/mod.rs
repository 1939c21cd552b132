//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ConversationStore` - Durable conversation persistence
//! - `AIProvider` - Text-generation engine (generate + count tokens)

mod ai_provider;
mod conversation_store;

pub use ai_provider::{AIError, AIProvider, GenerationOptions, ProviderInfo};
pub use conversation_store::{ConversationStore, StoreError};
