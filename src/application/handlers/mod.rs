//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod conversation;

pub use conversation::{
    // Queries
    GetMessagesHandler, GetMessagesQuery, ListConversationsHandler,
    // Commands
    CreateConversationHandler, DeleteConversationHandler,
    // Turns
    TurnCommand, TurnError, TurnOrchestrator, TurnOutcome, TurnReply, TurnSettings,
};
