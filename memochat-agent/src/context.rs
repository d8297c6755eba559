//! Context builder for assembling prompts

use memochat_core::config::DEFAULT_SYSTEM_PROMPT;
use memochat_core::session::{Role, Turn};
use memochat_providers::Message;

/// Builds the message list sent to the model
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    system_prompt: String,
}

impl ContextBuilder {
    /// Create a context builder with a custom system instruction
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// System instruction followed by every turn, in transcript order
    pub fn build_messages(&self, transcript: &[Turn]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.push(Message::system(&self.system_prompt));

        for turn in transcript {
            let message = match turn.role {
                Role::User => Message::user(&turn.text),
                Role::Assistant => Message::assistant(&turn.text),
            };
            messages.push(message);
        }

        messages
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_transcript_is_system_only() {
        let messages = ContextBuilder::default().build_messages(&[]);
        assert_eq!(messages, vec![Message::system("You are a helpful Assistant")]);
    }

    #[test]
    fn test_turns_follow_system_in_order() {
        let transcript = vec![
            Turn::user("What is 2+2?"),
            Turn::assistant("4"),
            Turn::user("And 3+3?"),
        ];

        let messages = ContextBuilder::default().build_messages(&transcript);
        assert_eq!(
            messages,
            vec![
                Message::system("You are a helpful Assistant"),
                Message::user("What is 2+2?"),
                Message::assistant("4"),
                Message::user("And 3+3?"),
            ]
        );
    }

    #[test]
    fn test_custom_system_prompt() {
        let builder = ContextBuilder::new("Answer in French");
        let messages = builder.build_messages(&[Turn::user("hi")]);
        assert_eq!(messages[0], Message::system("Answer in French"));
        assert_eq!(messages.len(), 2);
    }
}
