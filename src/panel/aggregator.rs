//! Fan-out aggregator: one concurrent call per selected persona.
//!
//! Results always come back in the order the personas were requested,
//! never in completion order. The first failure fails the whole
//! consultation and the remaining in-flight calls are dropped.

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::try_join_all;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::error::Result;
use crate::persona::{PersonaDefinition, PersonaRegistry};

use super::context::RenderedContext;
use super::invoker::PersonaInvoker;
use super::types::{PanelRequest, PersonaResponse};

/// Consults a set of personas concurrently for one request.
#[derive(Clone)]
pub struct PersonaPanel {
    registry: Arc<PersonaRegistry>,
    invoker: PersonaInvoker,
    /// Maximum calls in flight per consultation; 0 means unbounded
    max_concurrency: usize,
}

impl PersonaPanel {
    pub fn new(registry: Arc<PersonaRegistry>, invoker: PersonaInvoker) -> Self {
        Self {
            registry,
            invoker,
            max_concurrency: 0,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn registry(&self) -> &Arc<PersonaRegistry> {
        &self.registry
    }

    pub fn invoker(&self) -> &PersonaInvoker {
        &self.invoker
    }

    /// Run every selected persona and collect their answers in request order.
    ///
    /// Unknown identifiers are rejected before any backend call is made.
    pub async fn consult(&self, request: &PanelRequest) -> Result<Vec<PersonaResponse>> {
        let personas = self.registry.resolve(request.selected_personas.as_slice())?;
        if personas.is_empty() {
            debug!("No personas selected");
            return Ok(Vec::new());
        }

        let context = RenderedContext::render(&request.blueprint, &request.conversation_history);
        let start = Instant::now();

        info!(
            personas = personas.len(),
            max_concurrency = self.max_concurrency,
            "Consulting persona panel"
        );

        let calls: Vec<_> = personas
            .into_iter()
            .map(|persona| self.respond(persona, &context, &request.user_message))
            .collect();

        let responses = if self.max_concurrency == 0 {
            try_join_all(calls).await?
        } else {
            let indexed_calls: Vec<_> = calls
                .into_iter()
                .enumerate()
                .map(|(index, call)| async move { call.await.map(|response| (index, response)) })
                .collect();

            // Completion order, so a failure surfaces while earlier slots are still running
            let mut indexed: Vec<(usize, PersonaResponse)> = stream::iter(indexed_calls)
                .buffer_unordered(self.max_concurrency)
                .try_collect()
                .await?;
            indexed.sort_unstable_by_key(|(index, _)| *index);
            indexed.into_iter().map(|(_, response)| response).collect()
        };

        info!(
            personas = responses.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Persona panel complete"
        );

        Ok(responses)
    }

    async fn respond(
        &self,
        persona: &PersonaDefinition,
        context: &RenderedContext,
        user_message: &str,
    ) -> Result<PersonaResponse> {
        let text = self.invoker.invoke(persona, context, user_message).await?;
        Ok(PersonaResponse {
            persona: persona.id,
            name: persona.name.clone(),
            response: text,
        })
    }
}
