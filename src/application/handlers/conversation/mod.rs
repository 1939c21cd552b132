//! Conversation command and query handlers.
//!
//! Creating, reading, listing, and deleting conversations, plus the turn
//! orchestrator that drives generation.

mod create_conversation;
mod delete_conversation;
mod get_messages;
mod list_conversations;
mod process_turn;

pub use create_conversation::CreateConversationHandler;
pub use delete_conversation::DeleteConversationHandler;
pub use get_messages::{GetMessagesHandler, GetMessagesQuery};
pub use list_conversations::ListConversationsHandler;
pub use process_turn::{
    TurnCommand, TurnError, TurnOrchestrator, TurnOutcome, TurnReply, TurnSettings,
};
