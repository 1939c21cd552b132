//! Reply extraction from raw engine output.
//!
//! Completion engines tend to keep writing past the end of their turn,
//! inventing further "User:" lines or echoing a role label. The sanitizer
//! cuts the output back to a single clean assistant reply.

/// Markers that begin a fabricated follow-up turn.
const TURN_MARKERS: [&str; 2] = ["\nUser:", "\nAssistant:"];

/// Role labels stripped from the start of a reply.
const ROLE_PREFIXES: [&str; 3] = ["Assistant:", "Bot:", "AI:"];

/// Extracts a clean assistant reply from generated text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseSanitizer;

impl ResponseSanitizer {
    pub fn new() -> Self {
        Self
    }

    /// Returns the single assistant reply contained in `raw`.
    ///
    /// # Steps
    /// 1. Trim surrounding whitespace
    /// 2. Truncate at the first `"\nUser:"`, then at the first `"\nAssistant:"`
    /// 3. Strip leading role labels until none remain, re-trimming each time
    ///
    /// May return an empty string; callers decide whether that is acceptable.
    pub fn extract(&self, raw: &str) -> String {
        let mut text = raw.trim();

        for marker in TURN_MARKERS {
            if let Some(pos) = text.find(marker) {
                text = &text[..pos];
            }
        }

        let mut text = text.trim();
        while let Some(rest) = ROLE_PREFIXES
            .iter()
            .find_map(|prefix| text.strip_prefix(prefix))
        {
            text = rest.trim();
        }

        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(raw: &str) -> String {
        ResponseSanitizer::new().extract(raw)
    }

    #[test]
    fn trims_plain_reply() {
        assert_eq!(extract("  I'm fine, thanks!  "), "I'm fine, thanks!");
    }

    #[test]
    fn truncates_at_fabricated_user_turn() {
        assert_eq!(extract(" I'm fine.\nUser: and you?"), "I'm fine.");
    }

    #[test]
    fn truncates_at_fabricated_assistant_turn() {
        assert_eq!(extract("Sure thing.\nAssistant: Anything else?"), "Sure thing.");
    }

    #[test]
    fn truncates_at_earliest_marker_of_either_kind() {
        assert_eq!(
            extract("One.\nAssistant: Two.\nUser: Three."),
            "One."
        );
    }

    #[test]
    fn strips_role_prefix() {
        assert_eq!(extract("Assistant: Hello!"), "Hello!");
        assert_eq!(extract("Bot: Hello!"), "Hello!");
        assert_eq!(extract("AI:Hello!"), "Hello!");
    }

    #[test]
    fn strips_stacked_role_prefixes() {
        assert_eq!(extract("Assistant: AI: Hello"), "Hello");
    }

    #[test]
    fn prefix_must_be_at_start() {
        assert_eq!(extract("Say AI: hello"), "Say AI: hello");
    }

    #[test]
    fn keeps_internal_newlines() {
        assert_eq!(extract("Line one\nLine two"), "Line one\nLine two");
    }

    #[test]
    fn whitespace_only_becomes_empty() {
        assert_eq!(extract("   \n\t "), "");
    }

    #[test]
    fn label_only_becomes_empty() {
        assert_eq!(extract("Assistant:"), "");
        assert_eq!(extract("\nUser: hi"), "User: hi");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn extraction_is_idempotent(raw in "[ a-zA-Z:\\n]{0,60}") {
                let once = extract(&raw);
                prop_assert_eq!(extract(&once), once.clone());
            }

            #[test]
            fn output_never_contains_turn_markers(raw in "[ a-zA-Z:\\n]{0,60}") {
                let out = extract(&raw);
                prop_assert!(!out.contains("\nUser:"));
                prop_assert!(!out.contains("\nAssistant:"));
            }

            #[test]
            fn output_is_trimmed(raw in "\\PC{0,40}") {
                let out = extract(&raw);
                prop_assert_eq!(out.trim(), out.as_str());
            }
        }
    }
}
