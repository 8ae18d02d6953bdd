use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::ChatClient;
use crate::domain::{ClientConfig, DomainError};

const MESSAGES_PATH: &str = "/v1/messages";
const ANTHROPIC_API_VERSION: &str = "2023-06-01";
/// The Messages API caps the number of custom stop sequences; extra ones are dropped.
const MAX_STOP_SEQUENCES: usize = 4;

/// `top_p` is never sent: the Messages API rejects requests that set it
/// together with `temperature`.
#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
    top_k: u32,
    stop_sequences: Vec<&'a str>,
}

#[derive(serde::Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// HTTP client for the Anthropic Messages API (and compatible endpoints such as
/// LM Studio).
pub struct AnthropicClient {
    client: reqwest::Client,
    config: ClientConfig,
    /// Full endpoint URL (base + MESSAGES_PATH).
    url: String,
}

impl AnthropicClient {
    pub fn new(config: ClientConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                DomainError::internal(format!("AnthropicClient: cannot build HTTP client: {e}"))
            })?;
        let url = format!(
            "{}{}",
            config.base_url().trim_end_matches('/'),
            MESSAGES_PATH
        );

        Ok(Self {
            client,
            config,
            url,
        })
    }

    fn request<'a>(&'a self, system: &'a str, user: &'a str) -> ApiRequest<'a> {
        ApiRequest {
            model: self.config.model(),
            max_tokens: self.config.max_tokens(),
            system,
            messages: vec![ApiMessage {
                role: "user",
                content: user,
            }],
            temperature: self.config.temperature(),
            top_k: self.config.top_k(),
            // Whitespace-only sequences are rejected by the API.
            stop_sequences: self
                .config
                .stop()
                .iter()
                .map(String::as_str)
                .filter(|s| !s.trim().is_empty() && s.trim() == *s)
                .take(MAX_STOP_SEQUENCES)
                .collect(),
        }
    }
}

#[async_trait]
impl ChatClient for AnthropicClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, DomainError> {
        let request = self.request(system, user);

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", self.config.api_key())
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::upstream(format!("AnthropicClient: request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("AnthropicClient: API returned {status}: {body}");
            return Err(DomainError::upstream(format!(
                "AnthropicClient: API returned {status}"
            )));
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| {
            DomainError::upstream(format!("AnthropicClient: failed to parse response: {e}"))
        })?;

        let text: String = api_response
            .content
            .into_iter()
            .map(|b| b.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(DomainError::upstream(
                "AnthropicClient: response contained no text",
            ));
        }

        debug!("AnthropicClient raw completion: {}", text);
        Ok(text)
    }

    fn model_name(&self) -> &str {
        self.config.model()
    }
}
