//! Google Gemini provider implementation
//!
//! Implements the LLMProvider trait on top of the `generateContent` endpoint.
//! See: https://ai.google.dev/api/generate-content

use crate::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, Result, Role,
    StopReason, TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default model used across poketrade
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Configuration for the Gemini provider
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header
    pub api_key: String,

    /// Base URL for the API (default: the public v1beta endpoint)
    pub api_base: String,

    /// Request timeout in seconds (default: 60)
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Gemini provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a provider with custom configuration
    pub fn with_config(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LLMError::ConfigurationError(
                "Gemini API key must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a provider with an API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(GeminiConfig::new(api_key))
    }

    /// Get the current configuration
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending generateContent request");

        let model = request.model.clone();
        let body = GeminiRequest::from(request);

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.config.api_base, model
            ))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::from_status(status, error_text, &model));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        into_completion(parsed)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

// Gemini wire types (camelCase on the wire)

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

impl From<CompletionRequest> for GeminiRequest {
    fn from(request: CompletionRequest) -> Self {
        let contents = request
            .messages
            .into_iter()
            .map(|m| GeminiContent {
                role: Some(
                    match m.role {
                        Role::User => "user",
                        Role::Assistant => "model",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart { text: m.content }],
            })
            .collect();

        Self {
            contents,
            system_instruction: request.system.map(|text| GeminiContent {
                role: None,
                parts: vec![GeminiPart { text }],
            }),
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
                stop_sequences: request.stop_sequences,
            },
        }
    }
}

fn into_completion(response: GeminiResponse) -> Result<CompletionResponse> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        warn!("Prompt blocked by Gemini: {}", reason);
        return Err(LLMError::Blocked(reason));
    }

    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        LLMError::UnexpectedResponse("No candidates in response".to_string())
    })?;

    let text = candidate
        .content
        .unwrap_or_default()
        .parts
        .into_iter()
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join("");

    let usage = response
        .usage_metadata
        .map(|u| TokenUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        })
        .unwrap_or_default();

    let finish_reason = candidate.finish_reason.unwrap_or_default();
    debug!(
        "Received response - finish_reason: {}, tokens: {}/{}",
        finish_reason, usage.input_tokens, usage.output_tokens
    );

    Ok(CompletionResponse {
        message: Message::assistant(text),
        stop_reason: map_stop_reason(&finish_reason),
        usage,
    })
}

fn map_stop_reason(reason: &str) -> StopReason {
    match reason {
        "MAX_TOKENS" => StopReason::MaxTokens,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" => {
            StopReason::ContentFilter
        }
        _ => StopReason::EndTurn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_creation() {
        let provider = GeminiProvider::new("test-key").unwrap();
        assert_eq!(provider.name(), "gemini");
        assert_eq!(
            provider.config().api_base,
            "https://generativelanguage.googleapis.com/v1beta"
        );
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            GeminiProvider::new(""),
            Err(LLMError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_request_serialization() {
        let request = CompletionRequest::builder(DEFAULT_GEMINI_MODEL)
            .system("You are PokeTrade's assistant")
            .add_message(Message::user("hi"))
            .add_message(Message::assistant("hello"))
            .max_tokens(1000)
            .temperature(0.7)
            .build();

        let value = serde_json::to_value(GeminiRequest::from(request)).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][1]["role"], "model");
        assert_eq!(value["contents"][1]["parts"][0]["text"], "hello");
        assert_eq!(
            value["systemInstruction"]["parts"][0]["text"],
            "You are PokeTrade's assistant"
        );
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 1000);
        assert!(value["generationConfig"].get("stopSequences").is_none());
    }

    #[test]
    fn test_into_completion_joins_parts() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "BUY with "}, {"text": "80% confidence"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 20, "candidatesTokenCount": 5, "totalTokenCount": 25}
        }))
        .unwrap();

        let completion = into_completion(response).unwrap();
        assert_eq!(completion.message.text(), "BUY with 80% confidence");
        assert_eq!(completion.stop_reason, StopReason::EndTurn);
        assert_eq!(completion.usage.total(), 25);
    }

    #[test]
    fn test_blocked_prompt() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();

        assert!(matches!(into_completion(response), Err(LLMError::Blocked(r)) if r == "SAFETY"));
    }

    #[test]
    fn test_safety_finish_reason() {
        assert_eq!(map_stop_reason("SAFETY"), StopReason::ContentFilter);
        assert_eq!(map_stop_reason("MAX_TOKENS"), StopReason::MaxTokens);
        assert_eq!(map_stop_reason(""), StopReason::EndTurn);
    }
}
