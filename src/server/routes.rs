//! Axum route handlers for the persona panel HTTP service.
//!
//! # Routes
//!
//! - `POST /api/ai-personas`: Consult the selected personas
//! - `GET /api/personas`: List persona metadata
//! - `GET /health`: Liveness probe
//! - `GET /health/backend`: Generation backend reachability

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::backend::{GenerationBackend, OpenAiBackend};
use crate::config::PanelConfig;
use crate::error::{Error, Result};
use crate::panel::{PanelRequest, PanelResponse, PersonaInvoker, PersonaPanel};
use crate::persona::PersonaRegistry;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// Fan-out aggregator used by the consultation endpoint.
    pub panel: PersonaPanel,
    /// Read-only persona table.
    pub registry: Arc<PersonaRegistry>,
    /// Generation backend, probed by `/health/backend`.
    pub backend: Arc<dyn GenerationBackend>,
    /// Largest request body the router buffers.
    pub max_body_bytes: usize,
}

impl AppState {
    /// Wire the bundled personas to an explicit backend.
    pub fn with_backend(backend: Arc<dyn GenerationBackend>, config: &PanelConfig) -> Result<Self> {
        let registry = Arc::new(PersonaRegistry::bundled()?);
        let invoker = PersonaInvoker::from_settings(backend.clone(), &config.generation);
        let panel = PersonaPanel::new(registry.clone(), invoker)
            .with_max_concurrency(config.panel.max_concurrency);

        Ok(Self {
            panel,
            registry,
            backend,
            max_body_bytes: config.server.max_body_bytes,
        })
    }

    /// Production state: bundled personas backed by the configured OpenAI-compatible API.
    pub fn from_config(config: &PanelConfig) -> Result<Self> {
        let backend = OpenAiBackend::new(config.generation.openai_config())?;
        Self::with_backend(Arc::new(backend), config)
    }
}

/// Failure envelope shared by every endpoint.
#[derive(Debug, Serialize)]
struct FailureBody {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_client_error() {
            warn!(code = %self.code(), status = status.as_u16(), "Request rejected: {}", self);
        } else {
            error!(code = %self.code(), status = status.as_u16(), "Request failed: {}", self);
        }

        let body = FailureBody {
            success: false,
            error: self.to_string(),
            code: self.code().as_str(),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState, cors: bool) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);
    let router = Router::new()
        .route("/api/ai-personas", post(consult_handler))
        .route("/api/personas", get(personas_handler))
        .route("/health", get(health_handler))
        .route("/health/backend", get(backend_health_handler))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// `POST /api/ai-personas`: fan the message out to every selected persona.
///
/// Request:  `{ blueprint, userMessage, conversationHistory, selectedPersonas }`
/// Response: `{ success: true, responses: [{ persona, name, response }] }`
async fn consult_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PanelRequest>, JsonRejection>,
) -> Result<Json<PanelResponse>> {
    let Json(request) = payload.map_err(|rejection| rejection_error(rejection, state.max_body_bytes))?;

    let span = tracing::info_span!("consult", request_id = %Uuid::new_v4());
    async move {
        info!(
            personas = request.selected_personas.len(),
            history = request.conversation_history.len(),
            "Consultation received"
        );
        let responses = state.panel.consult(&request).await?;
        Ok::<_, Error>(Json(PanelResponse::ok(responses)))
    }
    .instrument(span)
    .await
}

/// Oversized bodies get their own code; every other rejection is malformed input.
fn rejection_error(rejection: JsonRejection, limit: usize) -> Error {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::RequestTooLarge { limit }
    } else {
        Error::malformed_request(rejection.body_text())
    }
}

/// `GET /api/personas`: metadata for every persona.
async fn personas_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "personas": state.registry.summaries(),
    }))
}

/// `GET /health`: liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "persona-panel",
    }))
}

/// `GET /health/backend`: probe the generation backend.
///
/// Answers 503 when the backend is unreachable so load balancers can act on it.
async fn backend_health_handler(State(state): State<AppState>) -> Result<Response> {
    let health = state.backend.health_check().await?;
    let status = if health.operational {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = json!({
        "backend": state.backend.name(),
        "model": state.panel.invoker().model(),
        "health": health,
    });
    Ok((status, Json(body)).into_response())
}
