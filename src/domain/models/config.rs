use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

pub const TOGETHER_BASE_URL: &str = "https://api.together.xyz";
pub const TOGETHER_MODEL: &str = "meta-llama/Meta-Llama-3.1-405B-Instruct-Turbo";
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_MODEL: &str = "claude-haiku-4-5";

/// Which completion API dialect to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI-compatible chat completions (Together, Ollama, LM Studio, ...).
    Together,
    Anthropic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Together => "together",
            Self::Anthropic => "anthropic",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Together => TOGETHER_BASE_URL,
            Self::Anthropic => ANTHROPIC_BASE_URL,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Together => TOGETHER_MODEL,
            Self::Anthropic => ANTHROPIC_MODEL,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "together" | "openai" | "ollama" => Ok(Self::Together),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(DomainError::invalid_input(format!(
                "unknown provider '{other}' (expected 'together' or 'anthropic')"
            ))),
        }
    }
}

/// Everything a completion client needs, passed explicitly at construction.
#[derive(Clone)]
pub struct ClientConfig {
    api_key: String,
    provider: Provider,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    top_k: u32,
    repetition_penalty: f32,
    stop: Vec<String>,
    timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::for_provider(Provider::Together, api_key)
    }

    pub fn for_provider(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            provider,
            base_url: provider.default_base_url().to_string(),
            model: provider.default_model().to_string(),
            temperature: 0.5,
            max_tokens: 1000,
            top_p: 0.7,
            top_k: 50,
            repetition_penalty: 1.2,
            stop: ["<|eot_id|>", "<|eom_id|>", "\n\n---\n\n", "\n\n---", "---", "\n---"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn top_p(&self) -> f32 {
        self.top_p
    }

    pub fn top_k(&self) -> u32 {
        self.top_k
    }

    pub fn repetition_penalty(&self) -> f32 {
        self.repetition_penalty
    }

    pub fn stop(&self) -> &[String] {
        &self.stop
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

// Keeps the key out of logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.api_key.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("ClientConfig")
            .field("api_key", &key)
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub const DEFAULT_PERSONA: &str = "\
Take the role of an OnlyFans content creator chatting with a fan. \
Generate a 1st person short response of 1 or 2 sentences that matches the creator's style, \
no extra comments nor explanations needed.";

/// Tuning knobs for few-shot selection and response generation.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    k: usize,
    max_attempts: usize,
    context_window: usize,
    chain_of_thought: bool,
    persona: String,
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        // Ensure the completion service is asked at least once
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_context_window(mut self, turns: usize) -> Self {
        self.context_window = turns.max(1);
        self
    }

    pub fn with_chain_of_thought(mut self, enabled: bool) -> Self {
        self.chain_of_thought = enabled;
        self
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn context_window(&self) -> usize {
        self.context_window
    }

    pub fn chain_of_thought(&self) -> bool {
        self.chain_of_thought
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            k: 3,
            max_attempts: 3,
            context_window: 10,
            chain_of_thought: true,
            persona: DEFAULT_PERSONA.to_string(),
        }
    }
}
