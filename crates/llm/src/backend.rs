//! LLM Backend implementations
//!
//! One OpenAI-compatible chat backend covers both remote providers:
//! - Groq: standard `/chat/completions`
//! - Minimax: `/text/chatcompletion_v2`, which reports application errors in
//!   a `base_resp` object while still answering HTTP 200
//!
//! Calls are single-shot. A failed call is reported, never retried here: the
//! caller's provider chain decides what happens next.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::prompt::Message;
use crate::LlmError;

/// LLM generation result
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Generated text
    pub text: String,
    /// Tokens generated
    pub tokens: usize,
    /// Total generation time (ms)
    pub total_time_ms: u64,
    /// Finish reason
    pub finish_reason: FinishReason,
}

/// Finish reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
}

/// LLM Backend trait
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a response
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError>;

    /// Provider name used in logs, metrics and reports ("groq", "minimax")
    fn provider_name(&self) -> &str;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Configuration for OpenAI-compatible backends
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Provider name
    pub name: String,
    /// API base URL
    pub endpoint: String,
    /// Chat completion path relative to the endpoint
    pub chat_path: String,
    /// API key
    pub api_key: String,
    /// Model name
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Temperature (0-2)
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
    /// Treat a non-zero `base_resp.status_code` in the body as an API error
    pub check_base_resp: bool,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            name: "openai".to_string(),
            endpoint: "https://api.openai.com/v1".to_string(),
            chat_path: "chat/completions".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 500,
            temperature: 0.6,
            timeout: Duration::from_secs(20),
            check_base_resp: false,
        }
    }
}

impl OpenAIConfig {
    /// Groq preset
    pub fn groq(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: "groq".to_string(),
            endpoint: "https://api.groq.com/openai/v1".to_string(),
            api_key: api_key.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    /// Minimax preset
    pub fn minimax(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: "minimax".to_string(),
            endpoint: "https://api.minimax.chat/v1".to_string(),
            chat_path: "text/chatcompletion_v2".to_string(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 400,
            check_base_resp: true,
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>, chat_path: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self.chat_path = chat_path.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// OpenAI-compatible backend
///
/// Works with:
/// - Groq
/// - Minimax chatcompletion_v2
/// - Local servers with OpenAI-compatible APIs
pub struct OpenAIBackend {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIBackend {
    /// Create new backend
    pub fn new(config: OpenAIConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() && !config.endpoint.starts_with("http://localhost") {
            return Err(LlmError::Configuration(format!(
                "API key required for {}",
                config.name
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Get the full API URL for chat completions
    fn chat_url(&self) -> String {
        format!(
            "{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.chat_path.trim_start_matches('/')
        )
    }

    /// Build request headers
    fn build_headers(&self) -> reqwest::header::HeaderMap {
        use reqwest::header::HeaderValue;

        let mut headers = reqwest::header::HeaderMap::new();

        let auth_value = format!("Bearer {}", self.config.api_key);
        if let Ok(val) = HeaderValue::from_str(&auth_value) {
            headers.insert(reqwest::header::AUTHORIZATION, val);
        }

        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        headers
    }

    fn build_request(&self, messages: &[Message]) -> OpenAIChatRequest {
        OpenAIChatRequest {
            model: self.config.model.clone(),
            messages: messages
                .iter()
                .map(|m| OpenAIMessage {
                    role: m.role.to_string(),
                    content: Some(m.content.clone()),
                })
                .collect(),
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
            stream: Some(false),
        }
    }
}

/// Decode a chat completion body into a result.
///
/// Separated from the HTTP call so the wire handling is testable offline.
pub(crate) fn decode_chat_response(
    body: &str,
    check_base_resp: bool,
    elapsed_ms: u64,
) -> Result<GenerationResult, LlmError> {
    let response: OpenAIChatResponse =
        serde_json::from_str(body).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

    if check_base_resp {
        if let Some(base) = &response.base_resp {
            if base.status_code != 0 {
                return Err(LlmError::Api(format!(
                    "status {}: {}",
                    base.status_code,
                    base.status_msg.as_deref().unwrap_or("unknown error")
                )));
            }
        }
    }

    let choice = response
        .choices
        .as_ref()
        .and_then(|choices| choices.first())
        .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

    let text = choice
        .message
        .content
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    if text.is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    Ok(GenerationResult {
        text: text.to_string(),
        tokens: response.usage.map(|u| u.completion_tokens).unwrap_or(0),
        total_time_ms: elapsed_ms,
        finish_reason: match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            _ => FinishReason::Stop,
        },
    })
}

#[async_trait]
impl LlmBackend for OpenAIBackend {
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
        let start = Instant::now();
        let request = self.build_request(messages);

        let response = self
            .client
            .post(self.chat_url())
            .headers(self.build_headers())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let body = response.text().await?;
        let result = decode_chat_response(
            &body,
            self.config.check_base_resp,
            start.elapsed().as_millis() as u64,
        )?;

        tracing::debug!(
            provider = %self.config.name,
            model = %self.config.model,
            tokens = result.tokens,
            elapsed_ms = result.total_time_ms,
            "Generation complete"
        );

        Ok(result)
    }

    fn provider_name(&self) -> &str {
        &self.config.name
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// OpenAI API types
#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    #[serde(default)]
    choices: Option<Vec<OpenAIChoice>>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
    #[serde(default)]
    base_resp: Option<BaseResp>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    #[serde(default)]
    completion_tokens: usize,
}

/// Minimax application-level status
#[derive(Debug, Deserialize)]
struct BaseResp {
    status_code: i64,
    status_msg: Option<String>,
}
