use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::application::ExampleLoader;
use crate::domain::{
    normalize_text, ConversationExample, DomainError, ExampleStore, Speaker, Turn,
};

/// Record shapes accepted in the dataset file.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRecord {
    ChatHistory {
        chat_history: RawChatHistory,
        output: String,
    },
    Canonical {
        context: Vec<RawTurn>,
        response: String,
    },
}

#[derive(Deserialize)]
struct RawChatHistory {
    messages: Vec<RawMessage>,
}

#[derive(Deserialize)]
struct RawMessage {
    from_creator: bool,
    content: String,
}

#[derive(Deserialize)]
struct RawTurn {
    speaker: Speaker,
    content: String,
}

/// Loads persona examples from a JSON array.
///
/// Two record shapes are accepted:
///
/// ```text
/// { "chat_history": { "messages": [ { "from_creator": false, "content": "hi" } ] },
///   "output": "hey you" }
/// { "context": [ { "speaker": "user", "content": "hi" } ], "response": "hey you" }
/// ```
pub struct JsonExampleLoader;

impl JsonExampleLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(json: &str) -> Result<ExampleStore, DomainError> {
        let records: Vec<RawRecord> = serde_json::from_str(json)
            .map_err(|e| DomainError::data_load(format!("dataset does not match schema: {e}")))?;

        let examples = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| Self::convert(i, record))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ExampleStore::new(examples))
    }

    fn convert(position: usize, record: RawRecord) -> Result<ConversationExample, DomainError> {
        let (context, response) = match record {
            RawRecord::ChatHistory {
                chat_history,
                output,
            } => {
                let turns = chat_history
                    .messages
                    .into_iter()
                    .map(|m| {
                        Turn::new(
                            Speaker::from_creator_flag(m.from_creator),
                            normalize_text(&m.content),
                        )
                    })
                    .collect::<Vec<_>>();
                (turns, output)
            }
            RawRecord::Canonical { context, response } => {
                let turns = context
                    .into_iter()
                    .map(|t| Turn::new(t.speaker, normalize_text(&t.content)))
                    .collect::<Vec<_>>();
                (turns, response)
            }
        };

        let response = normalize_text(&response);
        if response.is_empty() {
            return Err(DomainError::data_load(format!(
                "record {position} has an empty response"
            )));
        }

        Ok(ConversationExample::new(context, response))
    }
}

impl Default for JsonExampleLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExampleLoader for JsonExampleLoader {
    async fn load(&self, path: &Path) -> Result<ExampleStore, DomainError> {
        debug!("Reading dataset from {}", path.display());

        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::data_load(format!("cannot read {}: {e}", path.display())))?;

        let store = Self::parse(&json)?;
        info!(
            "Loaded {} examples ({} turns) from {}",
            store.len(),
            store.total_turns(),
            path.display()
        );
        Ok(store)
    }
}
