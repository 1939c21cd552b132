//! TurnOrchestrator - Command handler running one conversational turn.
//!
//! # Sequence
//!
//! 1. Validate the user message (non-empty after trimming)
//! 2. Record the user message
//! 3. Build a bounded context from the history preceding it
//! 4. Compose the prompt and generate, bounded by a timeout
//! 5. Extract a clean reply
//! 6. Record the reply with the sampling options as `modelConfig`
//!
//! The user message commit is unconditional once validation passes. The
//! assistant commit happens only for a real, non-empty reply. A failure
//! after step 2 leaves a valid conversation ending in the user message.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::domain::conversation::{
    ContextWindowBuilder, Message, MessageRole, ModelConfig, ResponseSanitizer, TokenBudget,
};
use crate::domain::foundation::{ConversationId, ErrorCode};
use crate::ports::{AIError, AIProvider, ConversationStore, GenerationOptions, StoreError};

/// Command to run one turn.
#[derive(Debug, Clone)]
pub struct TurnCommand {
    pub conversation_id: ConversationId,
    pub message: String,
    pub options: GenerationOptions,
}

/// Limits applied when assembling a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnSettings {
    /// History window, counting the new user message.
    pub max_history_messages: usize,
    pub max_context_tokens: u32,
    /// Tokens held back for the new turn and the generated reply.
    pub reserved_tokens: u32,
    /// Upper bound on a single generation call.
    pub generation_timeout: Duration,
}

impl TurnSettings {
    pub fn budget(&self) -> TokenBudget {
        TokenBudget::new(self.max_context_tokens, self.reserved_tokens)
    }
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self {
            max_history_messages: 10,
            max_context_tokens: 512,
            reserved_tokens: 100,
            generation_timeout: Duration::from_secs(60),
        }
    }
}

/// Successful turn result.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    pub conversation_id: ConversationId,
    pub response: String,
    pub prompt_token_count: u32,
    pub model_config: ModelConfig,
    /// Number of history messages dropped to fit the budget.
    pub truncated_messages: usize,
}

/// Errors that can occur during a turn.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("Message cannot be empty")]
    InvalidInput,

    #[error("Conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    /// The user message could not be recorded; nothing changed.
    #[error("Failed to record user message: {0}")]
    Storage(StoreError),

    /// Generation failed or timed out; the user message stays recorded.
    #[error("Generation failed: {0}")]
    GenerationFailure(#[from] AIError),

    /// Storage failed after the user message was recorded.
    #[error("Failed to complete turn: {0}")]
    StorageAfterUserMessage(StoreError),
}

impl TurnError {
    fn from_user_append(err: StoreError) -> Self {
        match err {
            StoreError::ConversationNotFound(id) => TurnError::ConversationNotFound(id),
            other => TurnError::Storage(other),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            TurnError::InvalidInput => ErrorCode::InvalidInput,
            TurnError::ConversationNotFound(_) => ErrorCode::ConversationNotFound,
            TurnError::Storage(e) | TurnError::StorageAfterUserMessage(e) => e.code(),
            TurnError::GenerationFailure(_) => ErrorCode::GenerationFailure,
        }
    }

    /// True if the user message is durably recorded despite the failure.
    pub fn user_message_recorded(&self) -> bool {
        matches!(
            self,
            TurnError::GenerationFailure(_) | TurnError::StorageAfterUserMessage(_)
        )
    }
}

/// Structured turn result; never a fault.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub success: bool,
    pub conversation_id: ConversationId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_token_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_config: Option<ModelConfig>,
    pub user_message_recorded: bool,
}

impl TurnOutcome {
    pub fn from_result(conversation_id: ConversationId, result: Result<TurnReply, TurnError>) -> Self {
        match result {
            Ok(reply) => Self {
                success: true,
                conversation_id,
                response: Some(reply.response),
                error: None,
                error_code: None,
                prompt_token_count: Some(reply.prompt_token_count),
                model_config: Some(reply.model_config),
                user_message_recorded: true,
            },
            Err(err) => Self {
                success: false,
                conversation_id,
                response: None,
                error: Some(err.to_string()),
                error_code: Some(err.code()),
                prompt_token_count: None,
                model_config: None,
                user_message_recorded: err.user_message_recorded(),
            },
        }
    }
}

/// Selects the history window that precedes the message at `position`.
///
/// Takes at most `max_history_messages - 1` messages, so the window
/// including the new user message never exceeds `max_history_messages`.
fn preceding_history(messages: &[Message], position: usize, max_history_messages: usize) -> &[Message] {
    let end = position.min(messages.len());
    let window = max_history_messages.saturating_sub(1);
    &messages[end.saturating_sub(window)..end]
}

/// Handler for conversational turns.
pub struct TurnOrchestrator {
    store: Arc<dyn ConversationStore>,
    provider: Arc<dyn AIProvider>,
    settings: TurnSettings,
    builder: ContextWindowBuilder,
    sanitizer: ResponseSanitizer,
}

impl TurnOrchestrator {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        provider: Arc<dyn AIProvider>,
        settings: TurnSettings,
    ) -> Self {
        Self {
            store,
            provider,
            settings,
            builder: ContextWindowBuilder::new(),
            sanitizer: ResponseSanitizer::new(),
        }
    }

    pub fn settings(&self) -> &TurnSettings {
        &self.settings
    }

    /// Runs one turn and folds any failure into a [`TurnOutcome`].
    pub async fn process_turn(&self, cmd: TurnCommand) -> TurnOutcome {
        let conversation_id = cmd.conversation_id;
        let result = self.handle(cmd).await;
        if let Err(err) = &result {
            match err {
                TurnError::InvalidInput | TurnError::ConversationNotFound(_) => {
                    tracing::debug!(conversation_id = %conversation_id, error = %err, "Turn rejected");
                }
                TurnError::GenerationFailure(_) => {
                    tracing::warn!(conversation_id = %conversation_id, error = %err, "Turn generation failed");
                }
                TurnError::Storage(_) | TurnError::StorageAfterUserMessage(_) => {
                    tracing::error!(conversation_id = %conversation_id, error = %err, "Turn storage failure");
                }
            }
        }
        TurnOutcome::from_result(conversation_id, result)
    }

    /// Runs one turn.
    ///
    /// # Errors
    /// See [`TurnError`]; `user_message_recorded()` tells whether the user
    /// message survived the failure.
    pub async fn handle(&self, cmd: TurnCommand) -> Result<TurnReply, TurnError> {
        let conversation_id = cmd.conversation_id;

        let message = cmd.message.trim();
        if message.is_empty() {
            return Err(TurnError::InvalidInput);
        }

        let position = self
            .store
            .append(conversation_id, MessageRole::User, message, None)
            .await
            .map_err(TurnError::from_user_append)?;

        let conversation = self
            .store
            .load(conversation_id)
            .await
            .map_err(TurnError::StorageAfterUserMessage)?;
        let history = preceding_history(
            conversation.messages(),
            position,
            self.settings.max_history_messages,
        );

        let provider = &self.provider;
        let context = self.builder.build(
            history,
            self.settings.budget().available_for_history(),
            |text| provider.count_tokens(text),
        );
        let prompt = self.builder.compose_prompt(&context.text, message);
        let prompt_token_count = self.provider.count_tokens(&prompt);

        tracing::debug!(
            conversation_id = %conversation_id,
            history = history.len(),
            dropped = context.dropped,
            prompt_tokens = prompt_token_count,
            "Prompt assembled"
        );

        let raw = tokio::time::timeout(
            self.settings.generation_timeout,
            self.provider.generate(&prompt, &cmd.options),
        )
        .await
        .map_err(|_| AIError::Timeout {
            timeout_secs: self.settings.generation_timeout.as_secs(),
        })??;

        let response = self.sanitizer.extract(&raw);
        if response.is_empty() {
            return Err(AIError::EmptyOutput.into());
        }

        let model_config = cmd.options.to_model_config();
        self.store
            .append(
                conversation_id,
                MessageRole::Assistant,
                &response,
                Some(model_config.clone()),
            )
            .await
            .map_err(TurnError::StorageAfterUserMessage)?;

        tracing::info!(
            conversation_id = %conversation_id,
            prompt_tokens = prompt_token_count,
            reply_chars = response.chars().count(),
            "Turn completed"
        );

        Ok(TurnReply {
            conversation_id,
            response,
            prompt_token_count,
            model_config,
            truncated_messages: context.dropped,
        })
    }
}
