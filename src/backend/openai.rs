//! OpenAI-compatible API backend
//!
//! Implements `GenerationBackend` by calling the chat completions endpoint of
//! any OpenAI-compatible service (OpenAI, Ollama, vLLM, LM Studio, gateways).
//! Each call is made exactly once; failures surface to the caller untouched.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::{FinishReason, GenerationOutput, GenerationRequest, TokenUsage};

use super::{BackendHealth, GenerationBackend};

// ─────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────

/// Connection settings for an OpenAI-compatible API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API base URL (e.g., "https://api.openai.com/v1", "http://localhost:11434/v1")
    pub base_url: String,

    /// API key (empty string for local servers like Ollama)
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            timeout_secs: 120,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// OpenAI API types (request/response)
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ─────────────────────────────────────────────────────────────────
// OpenAI Backend
// ─────────────────────────────────────────────────────────────────

/// OpenAI-compatible API backend
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiBackend {
    /// Create a new backend; fails only if the HTTP client cannot be built
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(crate::version::build_info().user_agent())
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            base_url = %config.base_url,
            timeout_secs = config.timeout_secs,
            "OpenAI-compatible backend created"
        );

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Build the authorization header value (if API key is set)
    fn auth_header(&self) -> Option<String> {
        if self.config.api_key.is_empty() {
            None
        } else {
            Some(format!("Bearer {}", self.config.api_key))
        }
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match self.auth_header() {
            Some(auth) => req.header("Authorization", auth),
            None => req,
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::GenerationTimeout {
                timeout_secs: self.config.timeout_secs,
            }
        } else if e.is_connect() {
            Error::generation_failed(format!("Connection error: {}", e))
        } else {
            Error::generation_failed(format!("Request error: {}", e))
        }
    }
}

/// Prefer the API's own error message over the raw body
fn rejection_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn health_check(&self) -> Result<BackendHealth> {
        let start = Instant::now();
        let req = self.authorized(self.client.get(self.endpoint("models")));

        let health = match req.send().await {
            Ok(resp) if resp.status().is_success() => {
                BackendHealth::healthy(start.elapsed().as_millis() as u64)
            }
            Ok(resp) => BackendHealth::unhealthy(
                start.elapsed().as_millis() as u64,
                format!("API returned status {}", resp.status()),
            ),
            Err(e) => BackendHealth::unhealthy(
                start.elapsed().as_millis() as u64,
                format!("Connection failed: {}", e),
            ),
        };
        Ok(health)
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutput> {
        let body = ChatCompletionRequest {
            model: &request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let req = self.authorized(self.client.post(self.endpoint("chat/completions")).json(&body));
        let response = req.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(status = %status, body = %text, "Generation backend rejected request");
            return Err(Error::GenerationRejected {
                status: status.as_u16(),
                message: rejection_message(&text),
            });
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e)
            } else {
                Error::generation_malformed(format!("Failed to parse API response: {}", e))
            }
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::generation_malformed("No choices in API response"))?;

        Ok(GenerationOutput {
            text: choice.message.content.unwrap_or_default(),
            finish_reason: FinishReason::from_api(choice.finish_reason.as_deref()),
            usage: parsed
                .usage
                .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens)),
        })
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
