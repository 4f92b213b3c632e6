//! Single-persona generation call.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::backend::GenerationBackend;
use crate::config::GenerationSettings;
use crate::error::Result;
use crate::persona::PersonaDefinition;
use crate::types::GenerationRequest;

use super::context::RenderedContext;

/// Runs one generation call per persona against a shared backend.
#[derive(Clone)]
pub struct PersonaInvoker {
    backend: Arc<dyn GenerationBackend>,
    model: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl PersonaInvoker {
    pub fn new(backend: Arc<dyn GenerationBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn from_settings(backend: Arc<dyn GenerationBackend>, settings: &GenerationSettings) -> Self {
        Self {
            backend,
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn backend(&self) -> &Arc<dyn GenerationBackend> {
        &self.backend
    }

    /// Build the request a persona sends for this context and message.
    pub fn build_request(
        &self,
        persona: &PersonaDefinition,
        context: &RenderedContext,
        user_message: &str,
    ) -> GenerationRequest {
        GenerationRequest {
            model: self.model.clone(),
            system_prompt: persona.system_prompt.clone(),
            prompt: context.persona_prompt(user_message, &persona.role),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    /// Generate this persona's answer. The text is returned verbatim.
    pub async fn invoke(
        &self,
        persona: &PersonaDefinition,
        context: &RenderedContext,
        user_message: &str,
    ) -> Result<String> {
        let request = self.build_request(persona, context, user_message);
        let start = Instant::now();

        match self.backend.generate(request).await {
            Ok(output) => {
                debug!(
                    persona = %persona.id,
                    backend = self.backend.name(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    finish_reason = ?output.finish_reason,
                    prompt_tokens = output.usage.map(|u| u.prompt_tokens),
                    completion_tokens = output.usage.map(|u| u.completion_tokens),
                    "Persona response generated"
                );
                Ok(output.text)
            }
            Err(e) => {
                warn!(
                    persona = %persona.id,
                    backend = self.backend.name(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    error = %e.format_for_log(),
                    "Persona generation failed"
                );
                Err(e.for_persona(persona.id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockBackend, MockConfig};
    use crate::error::Error;
    use crate::persona::{PersonaId, PersonaRegistry};
    use serde_json::json;

    fn context() -> RenderedContext {
        RenderedContext::render(&json!({"idea": "kiosk"}), &[])
    }

    #[tokio::test]
    async fn test_invoke_returns_text_verbatim() {
        let backend = Arc::new(MockBackend::with_config(MockConfig {
            fixed_response: Some("  padded\nanswer  ".into()),
            ..Default::default()
        }));
        let invoker = PersonaInvoker::new(backend.clone(), "test-model");
        let registry = PersonaRegistry::bundled().unwrap();
        let persona = registry.get(PersonaId::Strategist).unwrap();

        let text = invoker.invoke(persona, &context(), "Go?").await.unwrap();
        assert_eq!(text, "  padded\nanswer  ");
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_request_carries_persona_prompt() {
        let backend = Arc::new(MockBackend::new());
        let settings = GenerationSettings {
            model: "gpt-4-turbo".into(),
            max_tokens: Some(256),
            temperature: Some(0.4),
            ..Default::default()
        };
        let invoker = PersonaInvoker::from_settings(backend.clone(), &settings);
        let registry = PersonaRegistry::bundled().unwrap();
        let persona = registry.get(PersonaId::Technologist).unwrap();

        invoker.invoke(persona, &context(), "Which stack?").await.unwrap();

        let sent = &backend.requests()[0];
        assert_eq!(sent.model, "gpt-4-turbo");
        assert_eq!(sent.system_prompt, persona.system_prompt);
        assert_eq!(sent.max_tokens, Some(256));
        assert_eq!(sent.temperature, Some(0.4));
        assert!(sent.prompt.contains("User Message: Which stack?"));
        assert!(sent
            .prompt
            .ends_with("Provide a focused response from your perspective as the Technologist."));
    }

    #[tokio::test]
    async fn test_failure_names_persona() {
        let backend = Arc::new(MockBackend::with_config(
            MockConfig::default().fail_when("impact measurement"),
        ));
        let invoker = PersonaInvoker::new(backend, "m");
        let registry = PersonaRegistry::bundled().unwrap();
        let persona = registry.get(PersonaId::Impact).unwrap();

        let err = invoker.invoke(persona, &context(), "x").await.unwrap_err();
        match err {
            Error::PersonaFailed { persona, source } => {
                assert_eq!(persona, PersonaId::Impact);
                assert!(matches!(*source, Error::GenerationRejected { status: 503, .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
