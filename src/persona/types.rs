//! Core types for the persona system.
//!
//! A persona is a named advisory role with a fixed system prompt. The set of
//! personas is closed: adding one means adding a variant here and a bundled
//! definition under `config/personas/`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ─────────────────────────────────────────────────────────────────
// Persona Id
// ─────────────────────────────────────────────────────────────────

/// Identifier of one of the bundled personas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonaId {
    /// Strategy, market positioning and long-term viability.
    Strategist,
    /// Technical feasibility and implementation approach.
    Technologist,
    /// Social and environmental impact.
    Impact,
}

impl PersonaId {
    /// Slug used on the wire, in file names and CLI args.
    pub fn slug(&self) -> &'static str {
        match self {
            PersonaId::Strategist => "strategist",
            PersonaId::Technologist => "technologist",
            PersonaId::Impact => "impact",
        }
    }

    /// All persona ids in presentation order.
    pub fn all() -> &'static [PersonaId] {
        &[
            PersonaId::Strategist,
            PersonaId::Technologist,
            PersonaId::Impact,
        ]
    }

    /// Comma-separated list of valid slugs, for error messages.
    pub fn valid_slugs() -> String {
        PersonaId::all()
            .iter()
            .map(PersonaId::slug)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.slug())
    }
}

impl FromStr for PersonaId {
    type Err = Error;

    /// Exact match only, so the identifier echoed back equals the one requested.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PersonaId::all()
            .iter()
            .copied()
            .find(|id| id.slug() == s)
            .ok_or_else(|| Error::UnknownPersona {
                persona: s.to_string(),
                valid: PersonaId::valid_slugs(),
            })
    }
}

// ─────────────────────────────────────────────────────────────────
// Persona Definition (loaded from TOML)
// ─────────────────────────────────────────────────────────────────

/// Full persona definition, deserialized from a bundled TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaDefinition {
    /// Which persona this definition describes.
    pub id: PersonaId,

    /// Display name returned with every response (e.g. "Tech Lead").
    pub name: String,

    /// Role label used in the response framing instruction.
    pub role: String,

    /// Presentation accent for clients. Opaque to the service.
    pub accent: String,

    /// Short human-readable description.
    pub description: String,

    /// System prompt sent with every generation request for this persona.
    pub system_prompt: String,
}

/// Public metadata about a persona, as exposed by `GET /api/personas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaSummary {
    pub persona: PersonaId,
    pub name: String,
    pub role: String,
    pub color: String,
    pub description: String,
}

impl From<&PersonaDefinition> for PersonaSummary {
    fn from(def: &PersonaDefinition) -> Self {
        Self {
            persona: def.id,
            name: def.name.clone(),
            role: def.role.clone(),
            color: def.accent.clone(),
            description: def.description.clone(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
