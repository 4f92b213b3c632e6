//! Backend trait definitions
//!
//! Defines the `GenerationBackend` trait every text-generation client implements.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::types::{GenerationOutput, GenerationRequest};

// ─────────────────────────────────────────────────────────────────
// Backend Health
// ─────────────────────────────────────────────────────────────────

/// Reachability of a backend, as reported by `health_check`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendHealth {
    /// Whether the backend answered the probe successfully
    pub operational: bool,

    /// Round-trip time of the probe in milliseconds
    pub latency_ms: u64,

    /// Any error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BackendHealth {
    pub fn healthy(latency_ms: u64) -> Self {
        Self {
            operational: true,
            latency_ms,
            error: None,
        }
    }

    pub fn unhealthy(latency_ms: u64, error: impl Into<String>) -> Self {
        Self {
            operational: false,
            latency_ms,
            error: Some(error.into()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// GenerationBackend Trait
// ─────────────────────────────────────────────────────────────────

/// Core trait for text-generation backends
///
/// Object-safe so the server can hold an `Arc<dyn GenerationBackend>`.
/// Implementations must not retry or cache; a failed call is reported as is.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Backend name (e.g. "openai", "mock")
    fn name(&self) -> &'static str;

    /// Probe whether the backend is reachable
    async fn health_check(&self) -> Result<BackendHealth>;

    /// Run one generation call and return the text verbatim
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutput>;
}
