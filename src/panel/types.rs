//! Wire types for a panel consultation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::persona::PersonaId;

/// One prior exchange in the conversation, rendered as `role: content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: String,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Body of `POST /api/ai-personas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelRequest {
    /// Opaque blueprint document, echoed into every persona prompt
    #[serde(default)]
    pub blueprint: Value,

    pub user_message: String,

    #[serde(default)]
    pub conversation_history: Vec<ConversationTurn>,

    /// Raw identifiers; validated against the registry before any call
    pub selected_personas: Vec<String>,
}

impl PanelRequest {
    pub fn new(user_message: impl Into<String>, personas: &[&str]) -> Self {
        Self {
            blueprint: Value::Null,
            user_message: user_message.into(),
            conversation_history: Vec::new(),
            selected_personas: personas.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn with_blueprint(mut self, blueprint: Value) -> Self {
        self.blueprint = blueprint;
        self
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.conversation_history = history;
        self
    }
}

/// A single persona's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaResponse {
    pub persona: PersonaId,
    pub name: String,
    pub response: String,
}

/// Success envelope returned by the consultation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelResponse {
    pub success: bool,
    pub responses: Vec<PersonaResponse>,
}

impl PanelResponse {
    pub fn ok(responses: Vec<PersonaResponse>) -> Self {
        Self {
            success: true,
            responses,
        }
    }
}
