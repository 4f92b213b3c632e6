//! Generation request/response types
//!
//! The contract between a persona invocation and whichever backend serves it.

use serde::{Deserialize, Serialize};

/// One text-generation call: a system prompt plus a user prompt for a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model identifier understood by the backend (e.g. "gpt-4-turbo")
    pub model: String,

    /// Persona system prompt
    pub system_prompt: String,

    /// Rendered user prompt (context, history, message, framing)
    pub prompt: String,

    /// Maximum tokens to generate, if the caller wants a cap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature, if the caller wants to override the backend default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    pub fn new(
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            system_prompt: system_prompt.into(),
            prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
        }
    }
}

/// Output of a generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutput {
    /// Generated text, verbatim
    pub text: String,

    /// Why generation stopped
    pub finish_reason: FinishReason,

    /// Token accounting, when the backend reports it
    pub usage: Option<TokenUsage>,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,
    /// Number of tokens generated
    pub completion_tokens: u32,
    /// Total tokens (prompt + completion)
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt: u32, completion: u32) -> Self {
        Self {
            prompt_tokens: prompt,
            completion_tokens: completion,
            total_tokens: prompt.saturating_add(completion),
        }
    }
}

/// Reason why generation stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Hit a stop sequence or end of message
    #[default]
    Stop,
    /// Reached the max tokens limit
    Length,
    /// Content was filtered by the backend
    ContentFilter,
    /// Anything the backend reports that we do not model
    Other,
}

impl FinishReason {
    /// Map an OpenAI-style `finish_reason` string
    pub fn from_api(value: Option<&str>) -> Self {
        match value {
            None | Some("stop") => FinishReason::Stop,
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            Some(_) => FinishReason::Other,
        }
    }
}
