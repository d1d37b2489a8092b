use crate::{completion::ChatMessage, config::PromptSettings};

// NOTE:
// Example answers are sent with the `system` role, not `assistant`.
// The deployed prompt was tuned that way; keep the ordering and roles stable.

/// Fixed few-shot preamble the caller's prompt is appended to.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    preamble: Vec<ChatMessage>,
}

impl PromptTemplate {
    pub fn new(settings: &PromptSettings) -> Self {
        let mut preamble = Vec::with_capacity(1 + settings.examples.len() * 2);
        preamble.push(ChatMessage::system(settings.system_prompt.clone()));
        for example in &settings.examples {
            preamble.push(ChatMessage::user(example.user.clone()));
            preamble.push(ChatMessage::system(example.assistant.clone()));
        }
        Self { preamble }
    }

    pub fn preamble(&self) -> &[ChatMessage] {
        &self.preamble
    }

    /// Preamble followed by `prompt` as the final user turn.
    pub fn conversation(&self, prompt: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.preamble.len() + 1);
        messages.extend_from_slice(&self.preamble);
        messages.push(ChatMessage::user(prompt));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        completion::types::Role,
        config::PromptExample,
    };

    fn settings() -> PromptSettings {
        PromptSettings {
            system_prompt: "sys".into(),
            examples: (1..=3)
                .map(|i| PromptExample {
                    user: format!("q{i}"),
                    assistant: format!("a{i}"),
                })
                .collect(),
        }
    }

    #[test]
    fn preamble_has_seven_turns_in_fixed_order() {
        let template = PromptTemplate::new(&settings());
        let roles: Vec<Role> = template.preamble().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::System,
                Role::User,
                Role::System,
                Role::User,
                Role::System,
                Role::User,
                Role::System,
            ]
        );
        let contents: Vec<&str> = template
            .preamble()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["sys", "q1", "a1", "q2", "a2", "q3", "a3"]);
    }

    #[test]
    fn prompt_is_appended_verbatim_as_last_user_turn() {
        let template = PromptTemplate::new(&settings());
        let conversation = template.conversation("  Hello  ");
        assert_eq!(conversation.len(), 8);
        assert_eq!(&conversation[..7], template.preamble());
        assert_eq!(conversation[7], ChatMessage::user("  Hello  "));
    }
}
