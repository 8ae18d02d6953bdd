use std::fmt;

use serde::{Deserialize, Serialize};

/// Who produced a line of conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The person talking to the persona.
    User,
    /// The persona being emulated.
    Creator,
}

impl Speaker {
    pub fn from_creator_flag(from_creator: bool) -> Self {
        if from_creator {
            Self::Creator
        } else {
            Self::User
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Creator => "Creator",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single line of a stored conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    speaker: Speaker,
    content: String,
}

impl Turn {
    pub fn new(speaker: Speaker, content: impl Into<String>) -> Self {
        Self {
            speaker,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Speaker::User, content)
    }

    pub fn creator(content: impl Into<String>) -> Self {
        Self::new(Speaker::Creator, content)
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn render(&self) -> String {
        format!("{}: {}", self.speaker, self.content)
    }
}

/// Renders turns one per line as `Speaker: content`.
///
/// Stored contexts and live transcripts go through the same rendering so that
/// both land in the same embedding space.
pub fn render_turns<'a, I>(turns: I) -> String
where
    I: IntoIterator<Item = (Speaker, &'a str)>,
{
    turns
        .into_iter()
        .map(|(speaker, content)| format!("{}: {}", speaker, content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A labelled example of the persona's voice: what was said, and how the
/// persona answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationExample {
    context: Vec<Turn>,
    response: String,
}

impl ConversationExample {
    pub fn new(context: Vec<Turn>, response: impl Into<String>) -> Self {
        Self {
            context,
            response: response.into(),
        }
    }

    pub fn context(&self) -> &[Turn] {
        &self.context
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn context_text(&self) -> String {
        render_turns(self.context.iter().map(|t| (t.speaker(), t.content())))
    }
}
