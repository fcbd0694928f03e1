use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Core trait for LLM providers. Callers receive the provider explicitly
/// (usually as `Option<Arc<dyn LlmProvider>>`) so tests can inject fakes.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate completion for a given prompt
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse>;
}

/// Request structure for LLM generation
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub prompt: String,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
}

impl LlmRequest {
    /// Request with provider defaults for everything but the prompt.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
            timeout_seconds: None,
        }
    }
}

/// Response from LLM generation
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub usage: UsageMetadata,
    pub model: String,
}

/// Token usage metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

/// Coarse classification of a failed LLM call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmFailure {
    /// HTTP 429-class: rate limit or exhausted quota
    Quota,
    /// HTTP 403-class: key rejected
    Auth,
    Other,
}

impl LlmFailure {
    /// Classify by status-code substrings anywhere in the error chain.
    pub fn classify(err: &anyhow::Error) -> Self {
        let text = format!("{:#}", err);
        if text.contains("429") {
            LlmFailure::Quota
        } else if text.contains("403") {
            LlmFailure::Auth
        } else {
            LlmFailure::Other
        }
    }

    /// User-visible error label, if this failure has one.
    pub fn label(self) -> Option<&'static str> {
        match self {
            LlmFailure::Quota => Some("Quota Exceeded"),
            LlmFailure::Auth => Some("Invalid API Key"),
            LlmFailure::Other => None,
        }
    }
}

pub mod remote;
pub mod summarizer;
pub mod translator;

/// Helper to extract JSON from text that might contain markdown backticks or preamble
pub fn extract_json_from_text(text: &str) -> Option<String> {
    // 1. Try to find content between ```json and ```
    if let Some(start) = text.find("```json") {
        let rest = &text[start + 7..];
        if let Some(end) = rest.find("```") {
            return Some(rest[..end].trim().to_string());
        }
    }

    // 2. Try to find content between ``` and ```
    if let Some(start) = text.find("```") {
        let rest = &text[start + 3..];
        if let Some(end) = rest.find("```") {
            return Some(rest[..end].trim().to_string());
        }
    }

    // 3. Try to find the first '{' and last '}'
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return Some(text[start..=end].to_string());
        }
    }

    None
}
