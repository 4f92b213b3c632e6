//! Mock backend for testing
//!
//! Deterministic `GenerationBackend` that records every request, can delay or
//! fail calls selected by a substring of the system prompt, and tracks how
//! many calls were in flight at once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::types::{FinishReason, GenerationOutput, GenerationRequest, TokenUsage};

use super::{BackendHealth, GenerationBackend};

// ─────────────────────────────────────────────────────────────────
// Mock Backend Configuration
// ─────────────────────────────────────────────────────────────────

/// Configuration for mock backend behavior
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Latency applied to every call
    pub latency: Duration,

    /// Extra delay for calls whose system prompt contains the needle
    pub delays: Vec<(String, Duration)>,

    /// Calls whose system prompt contains any of these needles fail
    pub failures: Vec<String>,

    /// Fixed response text (otherwise the response echoes the request)
    pub fixed_response: Option<String>,

    /// Report the backend as unreachable from `health_check`
    pub fail_health: bool,
}

impl MockConfig {
    pub fn delay_when(mut self, needle: impl Into<String>, delay: Duration) -> Self {
        self.delays.push((needle.into(), delay));
        self
    }

    pub fn fail_when(mut self, needle: impl Into<String>) -> Self {
        self.failures.push(needle.into());
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

// ─────────────────────────────────────────────────────────────────
// Mock Backend
// ─────────────────────────────────────────────────────────────────

/// Mock implementation of `GenerationBackend` for testing
#[derive(Debug, Default)]
pub struct MockBackend {
    config: MockConfig,
    requests: RwLock<Vec<GenerationRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Decrements the in-flight counter even if the call future is dropped early
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Number of generation calls received
    pub fn call_count(&self) -> usize {
        self.requests.read().len()
    }

    /// Snapshot of every request received, in arrival order
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.read().clone()
    }

    /// Highest number of concurrently running calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.requests.write().clear();
        self.max_in_flight.store(0, Ordering::SeqCst);
    }

    fn delay_for(&self, request: &GenerationRequest) -> Duration {
        let extra = self
            .config
            .delays
            .iter()
            .find(|(needle, _)| request.system_prompt.contains(needle.as_str()))
            .map(|(_, delay)| *delay)
            .unwrap_or_default();
        self.config.latency + extra
    }

    fn should_fail(&self, request: &GenerationRequest) -> bool {
        self.config
            .failures
            .iter()
            .any(|needle| request.system_prompt.contains(needle.as_str()))
    }

    fn response_text(&self, request: &GenerationRequest) -> String {
        if let Some(ref fixed) = self.config.fixed_response {
            return fixed.clone();
        }
        let framing = request.prompt.lines().last().unwrap_or_default();
        format!("[{}] {}", request.system_prompt, framing)
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn health_check(&self) -> Result<BackendHealth> {
        if self.config.fail_health {
            Ok(BackendHealth::unhealthy(0, "Simulated outage"))
        } else {
            Ok(BackendHealth::healthy(0))
        }
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutput> {
        self.requests.write().push(request.clone());

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        let delay = self.delay_for(&request);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.should_fail(&request) {
            return Err(Error::GenerationRejected {
                status: 503,
                message: "Simulated backend failure".to_string(),
            });
        }

        let text = self.response_text(&request);
        let completion_tokens = text.split_whitespace().count() as u32;
        let prompt_tokens = request.prompt.split_whitespace().count() as u32;

        Ok(GenerationOutput {
            text,
            finish_reason: FinishReason::Stop,
            usage: Some(TokenUsage::new(prompt_tokens, completion_tokens)),
        })
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
