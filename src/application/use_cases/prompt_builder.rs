use crate::domain::{render_entries, ScoredExample, SituationalContext, TranscriptEntry};

const DEMO_SEPARATOR: &str = "\n\n---\n\n";
const CONTEXT_DESC: &str = "Previous messages in the conversation currently going on";
const REASONING_PREFIX: &str = "Reasoning: Let's think step by step in order to";

/// The two halves of a completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn len(&self) -> usize {
        self.system.len() + self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.system.is_empty() && self.user.is_empty()
    }
}

/// Lays out persona instructions, exemplars and the live conversation in a
/// `Context:` / `Response:` field format the reply extractor understands.
pub struct PromptBuilder<'a> {
    persona: &'a str,
    directive: Option<&'a str>,
    chain_of_thought: bool,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(persona: &'a str) -> Self {
        Self {
            persona,
            directive: None,
            chain_of_thought: false,
        }
    }

    pub fn with_directive(mut self, directive: &'a str) -> Self {
        self.directive = Some(directive);
        self
    }

    pub fn with_chain_of_thought(mut self, enabled: bool) -> Self {
        self.chain_of_thought = enabled;
        self
    }

    pub fn build(
        &self,
        exemplars: &[ScoredExample],
        window: &[TranscriptEntry],
        situation: &SituationalContext,
    ) -> Prompt {
        Prompt {
            system: self.system(situation),
            user: self.user(exemplars, window),
        }
    }

    fn system(&self, situation: &SituationalContext) -> String {
        let mut parts = vec![self.persona.trim().to_string()];

        if let Some(directive) = self.directive {
            parts.push(directive.to_string());
        }

        parts.push(situation.describe());

        let mut format = String::from("Follow the following format.\n\n");
        format.push_str(&format!("Context: {CONTEXT_DESC}\n"));
        if self.chain_of_thought {
            format.push_str(&format!(
                "{REASONING_PREFIX} ${{produce the response}}. We ...\n"
            ));
        }
        format.push_str("Response: the creator's reply, one or two sentences");
        parts.push(format);

        parts.join("\n\n")
    }

    fn user(&self, exemplars: &[ScoredExample], window: &[TranscriptEntry]) -> String {
        let mut sections: Vec<String> = exemplars
            .iter()
            .map(|s| {
                format!(
                    "Context:\n{}\nResponse: {}",
                    s.example().context_text(),
                    s.example().response()
                )
            })
            .collect();

        let tail = if self.chain_of_thought {
            REASONING_PREFIX
        } else {
            "Response:"
        };
        sections.push(format!("Context:\n{}\n{}", render_entries(window), tail));

        sections.join(DEMO_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Local;

    use super::*;
    use crate::domain::{ConversationExample, Speaker, Turn};

    fn exemplar(context: &str, response: &str) -> ScoredExample {
        ScoredExample::new(0, 0.9, ConversationExample::new(vec![Turn::user(context)], response))
    }

    fn situation() -> SituationalContext {
        SituationalContext::new(Local::now(), Duration::from_secs(0))
    }

    #[test]
    fn test_exemplars_come_before_live_context() {
        let window = vec![TranscriptEntry::new(Speaker::User, "hello")];
        let prompt = PromptBuilder::new("Be nice.").build(
            &[exemplar("hi", "hey cutie"), exemplar("bye", "see ya")],
            &window,
            &situation(),
        );

        let first = prompt.user.find("Response: hey cutie").unwrap();
        let second = prompt.user.find("Response: see ya").unwrap();
        let live = prompt.user.find("Context:\nUser: hello\nResponse:").unwrap();
        assert!(first < second && second < live);
        assert!(prompt.user.ends_with("Response:"));
        assert_eq!(prompt.user.matches(DEMO_SEPARATOR).count(), 2);
    }

    #[test]
    fn test_system_carries_persona_directive_and_situation() {
        let prompt = PromptBuilder::new("Be nice.")
            .with_directive("No socials.")
            .build(&[], &[], &situation());

        assert!(prompt.system.starts_with("Be nice."));
        assert!(prompt.system.contains("No socials."));
        assert!(prompt.system.contains("The conversation has been going on for"));
        assert!(!prompt.system.contains("Reasoning:"));
    }

    #[test]
    fn test_chain_of_thought_primes_reasoning() {
        let window = vec![TranscriptEntry::new(Speaker::User, "hello")];
        let prompt = PromptBuilder::new("Be nice.")
            .with_chain_of_thought(true)
            .build(&[], &window, &situation());

        assert!(prompt.user.ends_with(REASONING_PREFIX));
        assert!(prompt.system.contains("Reasoning:"));
        assert!(!prompt.is_empty());
    }
}
