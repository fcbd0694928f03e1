use anyhow::{Context, Result};
use common::RemoteLlmConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{LlmProvider, LlmRequest, LlmResponse, UsageMetadata};

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_API_KEY_ENV: &str = "LLM_API_KEY";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Chat-completions client for any OpenAI-compatible endpoint (OpenAI,
/// Gemini's compatibility layer, Ollama, ...).
pub struct RemoteLlmProvider {
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
    max_tokens: usize,
    temperature: f32,
    client: reqwest::Client,
}

impl RemoteLlmProvider {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout: Duration::from_secs(30),
            max_tokens: 1500,
            temperature: 0.7,
            client: reqwest::Client::new(),
        }
    }

    /// Build from `[llm.remote]`. The key is read from the configured
    /// environment variable; a missing or blank key is an error.
    pub fn from_config(config: &RemoteLlmConfig) -> Result<Self> {
        let key_env = config.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV);
        let api_key = std::env::var(key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .with_context(|| format!("{} not set", key_env))?;

        let provider = Self::new(
            config.api_url.as_deref().unwrap_or(DEFAULT_API_URL),
            api_key,
            config.model.as_deref().unwrap_or(DEFAULT_MODEL),
        );
        Ok(provider.with_defaults(
            config.timeout_seconds.unwrap_or(30),
            config.max_tokens.unwrap_or(1500),
            0.7,
        ))
    }

    pub fn with_defaults(mut self, timeout_secs: u64, max_tokens: usize, temperature: f32) -> Self {
        self.timeout = Duration::from_secs(timeout_secs);
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_request(&self, request: LlmRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(request.prompt),
            }],
            max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
            temperature: request.temperature.unwrap_or(self.temperature),
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for RemoteLlmProvider {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse> {
        let timeout = request
            .timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(self.timeout);
        let body = self.chat_request(request);

        let response = tokio::time::timeout(
            timeout,
            self.client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send(),
        )
        .await
        .context("LLM request timed out")?
        .context("LLM HTTP request failed")?;

        // The status code must stay in the message: callers classify quota/auth failures from it
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("LLM API error {}: {}", status, detail);
        }

        let completion: ChatCompletion = tokio::time::timeout(timeout, response.json())
            .await
            .context("LLM response timed out")?
            .context("failed to decode chat completion")?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("LLM response has no message content")?;

        Ok(LlmResponse {
            content,
            usage: completion.usage.map(UsageMetadata::from).unwrap_or_default(),
            model: completion.model.unwrap_or_else(|| self.model.clone()),
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TokenUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

impl From<TokenUsage> for UsageMetadata {
    fn from(usage: TokenUsage) -> Self {
        UsageMetadata {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}
