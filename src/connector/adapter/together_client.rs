use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::ChatClient;
use crate::domain::{ClientConfig, DomainError};

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    top_k: u32,
    repetition_penalty: f32,
    #[serde(skip_serializing_if = "no_stop_sequences")]
    stop: &'a [String],
}

fn no_stop_sequences(stop: &&[String]) -> bool {
    stop.is_empty()
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Minimal subset of the chat-completions response we care about.
#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP client for OpenAI-compatible chat-completion endpoints.
///
/// Targets Together AI by default. Any server speaking the same dialect works
/// by overriding the base URL, e.g. Ollama at `http://localhost:11434` (where
/// the API key is ignored). Together-specific sampling fields (`top_k`,
/// `repetition_penalty`) are sent as-is; servers that do not know them ignore
/// them.
pub struct TogetherClient {
    client: reqwest::Client,
    config: ClientConfig,
    /// Full endpoint URL (base + CHAT_COMPLETIONS_PATH).
    url: String,
}

impl TogetherClient {
    pub fn new(config: ClientConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                DomainError::internal(format!("TogetherClient: cannot build HTTP client: {e}"))
            })?;
        let url = format!(
            "{}{}",
            config.base_url().trim_end_matches('/'),
            CHAT_COMPLETIONS_PATH
        );

        Ok(Self {
            client,
            config,
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request<'a>(&'a self, system: &'a str, user: &'a str) -> ApiRequest<'a> {
        ApiRequest {
            model: self.config.model(),
            messages: vec![
                ApiMessage {
                    role: "system",
                    content: system,
                },
                ApiMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.config.temperature(),
            max_tokens: self.config.max_tokens(),
            top_p: self.config.top_p(),
            top_k: self.config.top_k(),
            repetition_penalty: self.config.repetition_penalty(),
            stop: self.config.stop(),
        }
    }
}

#[async_trait]
impl ChatClient for TogetherClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, DomainError> {
        let request = self.request(system, user);

        let mut builder = self.client.post(&self.url).json(&request);
        if !self.config.api_key().is_empty() {
            builder = builder.bearer_auth(self.config.api_key());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                DomainError::upstream(format!(
                    "TogetherClient: request timed out after {}s",
                    self.config.timeout().as_secs()
                ))
            } else {
                DomainError::upstream(format!("TogetherClient: request failed: {e}"))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("TogetherClient: API returned {status}: {body}");
            return Err(DomainError::upstream(format!(
                "TogetherClient: API returned {status}"
            )));
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| {
            DomainError::upstream(format!("TogetherClient: failed to parse response: {e}"))
        })?;

        let text = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DomainError::upstream("TogetherClient: response contained no choices"))?;

        debug!("TogetherClient raw completion: {}", text);
        Ok(text)
    }

    fn model_name(&self) -> &str {
        self.config.model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_sampling_parameters() {
        let client = TogetherClient::new(ClientConfig::new("key").with_model("m")).unwrap();
        let json = serde_json::to_value(client.request("sys", "usr")).unwrap();

        assert_eq!(json["model"], "m");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "usr");
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["top_k"], 50);
        assert!(json["stop"].as_array().is_some_and(|s| !s.is_empty()));
    }

    #[test]
    fn empty_stop_list_is_omitted() {
        let client = TogetherClient::new(ClientConfig::new("key").with_stop(vec![])).unwrap();
        let json = serde_json::to_value(client.request("sys", "usr")).unwrap();
        assert!(json.get("stop").is_none());
    }

    #[test]
    fn url_joins_base_without_double_slash() {
        let config = ClientConfig::new("key").with_base_url("http://localhost:11434/");
        let client = TogetherClient::new(config).unwrap();
        assert_eq!(client.url(), "http://localhost:11434/v1/chat/completions");
    }
}
