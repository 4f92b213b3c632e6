//! Common test utilities and fixtures
//!
//! This module provides shared test infrastructure

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use persona_panel::backend::{MockBackend, MockConfig};
use persona_panel::config::PanelConfig;
use persona_panel::server::{app_router, AppState};

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Get the valid config fixture path
pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

/// Get the invalid config fixture path
pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

/// Needles matching each bundled persona's system prompt
pub const STRATEGIST_PROMPT: &str = "strategic innovation advisor";
pub const TECHNOLOGIST_PROMPT: &str = "technology expert";
pub const IMPACT_PROMPT: &str = "impact measurement specialist";

/// Router backed by a mock, plus a handle to inspect the calls it received
pub struct TestApp {
    pub router: Router,
    pub backend: Arc<MockBackend>,
}

impl TestApp {
    pub fn new(mock: MockConfig) -> Self {
        Self::with_config(mock, PanelConfig::default())
    }

    pub fn with_config(mock: MockConfig, config: PanelConfig) -> Self {
        let backend = Arc::new(MockBackend::with_config(mock));
        let state = AppState::with_backend(backend.clone(), &config).unwrap();
        Self {
            router: app_router(state, config.server.cors),
            backend,
        }
    }

    /// POST a raw body to the consultation endpoint
    pub async fn post_raw(&self, body: impl Into<Body>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/ai-personas")
            .header("Content-Type", "application/json")
            .body(body.into())
            .unwrap();
        self.send(request).await
    }

    /// POST a JSON value to the consultation endpoint
    pub async fn consult(&self, body: &Value) -> (StatusCode, Value) {
        self.post_raw(body.to_string()).await
    }

    /// GET any route
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        split(response).await
    }
}

async fn split(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_dir_exists() {
        assert!(fixtures_dir().exists(), "Fixtures directory should exist");
    }

    #[test]
    fn test_valid_config_exists() {
        assert!(
            valid_config_fixture().exists(),
            "Valid config fixture should exist"
        );
    }

    #[test]
    fn test_invalid_config_exists() {
        assert!(
            invalid_config_fixture().exists(),
            "Invalid config fixture should exist"
        );
    }
}
