//! Context window construction for text generation.
//!
//! Renders prior messages into a plain-text transcript that fits within a
//! token budget, then frames the newest user input as a completion prompt.

use super::message::Message;

/// Minimum number of messages kept even when the budget is exceeded.
pub const MIN_RETAINED_MESSAGES: usize = 2;

/// Token budget for a single prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBudget {
    /// Maximum tokens the generation engine accepts.
    pub max_context_tokens: u32,
    /// Tokens held back for the generated reply.
    pub reserved_for_response: u32,
}

impl TokenBudget {
    pub fn new(max_context_tokens: u32, reserved_for_response: u32) -> Self {
        Self {
            max_context_tokens,
            reserved_for_response,
        }
    }

    /// Returns the tokens left for history (context minus reserved).
    pub fn available_for_history(&self) -> u32 {
        self.max_context_tokens.saturating_sub(self.reserved_for_response)
    }
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self::new(512, 100)
    }
}

/// Result of building a context window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltContext {
    /// Rendered transcript, one `"<Role>: <content>"` line per message.
    pub text: String,
    /// Number of messages kept in the transcript.
    pub retained: usize,
    /// Number of oldest messages dropped to fit the budget.
    pub dropped: usize,
}

impl BuiltContext {
    pub fn was_truncated(&self) -> bool {
        self.dropped > 0
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Builds token-bounded transcripts from conversation history.
///
/// Stateless; the token counter is supplied per call so the same builder
/// serves any generation engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextWindowBuilder;

impl ContextWindowBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Renders `history` (oldest first) into a transcript within `max_tokens`.
    ///
    /// Oldest messages are dropped while the rendered text exceeds the budget
    /// and more than [`MIN_RETAINED_MESSAGES`] remain. The floor wins over the
    /// budget, so the result may still exceed `max_tokens`.
    pub fn build<F>(&self, history: &[Message], max_tokens: u32, count_tokens: F) -> BuiltContext
    where
        F: Fn(&str) -> u32,
    {
        if history.is_empty() {
            return BuiltContext {
                text: String::new(),
                retained: 0,
                dropped: 0,
            };
        }

        let lines: Vec<String> = history.iter().map(Message::render).collect();
        let mut start = 0;
        let mut text = lines.join("\n");

        while count_tokens(&text) > max_tokens && lines.len() - start > MIN_RETAINED_MESSAGES {
            start += 1;
            text = lines[start..].join("\n");
        }

        BuiltContext {
            text,
            retained: lines.len() - start,
            dropped: start,
        }
    }

    /// Frames `user_message` after `context` as a completion prompt.
    ///
    /// The prompt always ends with `"Assistant:"` so the engine continues
    /// in the assistant's voice.
    pub fn compose_prompt(&self, context: &str, user_message: &str) -> String {
        if context.is_empty() {
            format!("User: {}\nAssistant:", user_message)
        } else {
            format!("{}\nUser: {}\nAssistant:", context, user_message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::MessageRole;
    use crate::domain::foundation::Timestamp;

    fn word_count(text: &str) -> u32 {
        text.split_whitespace().count() as u32
    }

    fn create_messages(count: usize) -> Vec<Message> {
        (0..count)
            .map(|i| {
                let role = if i % 2 == 0 {
                    MessageRole::User
                } else {
                    MessageRole::Assistant
                };
                Message::new(role, format!("message {}", i), Timestamp::now())
            })
            .collect()
    }

    mod token_budget {
        use super::*;

        #[test]
        fn available_for_history_subtracts_reserved() {
            let budget = TokenBudget::new(512, 100);
            assert_eq!(budget.available_for_history(), 412);
        }

        #[test]
        fn available_for_history_handles_underflow() {
            let budget = TokenBudget::new(50, 100);
            assert_eq!(budget.available_for_history(), 0);
        }
    }

    mod build {
        use super::*;

        #[test]
        fn empty_history_yields_empty_text() {
            let built = ContextWindowBuilder::new().build(&[], 100, word_count);

            assert_eq!(built.text, "");
            assert!(built.is_empty());
            assert_eq!(built.retained, 0);
        }

        #[test]
        fn renders_roles_with_labels_in_order() {
            let history = vec![
                Message::new(MessageRole::User, "Hello", Timestamp::now()),
                Message::new(MessageRole::Assistant, "Hi there", Timestamp::now()),
            ];

            let built = ContextWindowBuilder::new().build(&history, 100, word_count);

            assert_eq!(built.text, "User: Hello\nAssistant: Hi there");
            assert!(!built.was_truncated());
        }

        #[test]
        fn drops_oldest_until_within_budget() {
            // Each rendered line is three words: "<Role>: message <n>".
            let history = create_messages(4);

            let built = ContextWindowBuilder::new().build(&history, 7, word_count);

            assert_eq!(built.dropped, 2);
            assert_eq!(built.text, "User: message 2\nAssistant: message 3");
        }

        #[test]
        fn keeps_two_messages_even_over_budget() {
            let history = create_messages(6);

            let built = ContextWindowBuilder::new().build(&history, 0, word_count);

            assert_eq!(built.retained, 2);
            assert_eq!(built.text, "User: message 4\nAssistant: message 5");
        }

        #[test]
        fn single_message_over_budget_is_kept() {
            let history = create_messages(1);

            let built = ContextWindowBuilder::new().build(&history, 0, word_count);

            assert_eq!(built.text, "User: message 0");
            assert_eq!(built.dropped, 0);
        }
    }

    mod compose_prompt {
        use super::*;

        #[test]
        fn without_context() {
            let prompt = ContextWindowBuilder::new().compose_prompt("", "Hello");
            assert_eq!(prompt, "User: Hello\nAssistant:");
        }

        #[test]
        fn with_context() {
            let prompt = ContextWindowBuilder::new()
                .compose_prompt("User: Hello\nAssistant: Hi there", "How are you?");
            assert_eq!(
                prompt,
                "User: Hello\nAssistant: Hi there\nUser: How are you?\nAssistant:"
            );
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn result_is_a_suffix_that_fits_or_hits_the_floor(
                count in 0usize..20,
                budget in 0u32..40,
            ) {
                let history = create_messages(count);
                let built = ContextWindowBuilder::new().build(&history, budget, word_count);

                prop_assert_eq!(built.retained + built.dropped, count);
                prop_assert!(
                    word_count(&built.text) <= budget
                        || built.retained <= MIN_RETAINED_MESSAGES
                );

                let expected: Vec<String> =
                    history[built.dropped..].iter().map(Message::render).collect();
                prop_assert_eq!(built.text, expected.join("\n"));
            }

            #[test]
            fn drops_nothing_when_everything_fits(count in 0usize..20) {
                let history = create_messages(count);
                let built = ContextWindowBuilder::new().build(&history, u32::MAX, word_count);

                prop_assert_eq!(built.dropped, 0);
            }
        }
    }
}
