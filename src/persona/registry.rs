//! Bundled persona registry: the read-only table of persona definitions.
//!
//! Built once at startup from the TOML files under `config/personas/` and
//! shared behind an `Arc` for the lifetime of the process.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Error, Result};

use super::types::{PersonaDefinition, PersonaId, PersonaSummary};

/// Immutable mapping from persona id to its definition.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    definitions: BTreeMap<PersonaId, PersonaDefinition>,
}

impl PersonaRegistry {
    /// Load and validate every bundled persona definition.
    pub fn bundled() -> Result<Self> {
        let mut definitions = Vec::with_capacity(PersonaId::all().len());
        for id in PersonaId::all() {
            let raw = Self::bundled_config(*id);
            let def: PersonaDefinition = toml::from_str(raw).map_err(|e| {
                Error::config_parse(format!("bundled persona '{}' is invalid", id), e)
            })?;
            if def.id != *id {
                return Err(Error::config_field_invalid(
                    "id",
                    format!(
                        "bundled definition for '{}' declares id '{}'",
                        id, def.id
                    ),
                ));
            }
            definitions.push(def);
        }

        let registry = Self::from_definitions(definitions)?;
        debug!(personas = registry.len(), "Persona registry loaded");
        Ok(registry)
    }

    /// Build a registry from explicit definitions.
    ///
    /// Every `PersonaId` must be defined exactly once.
    pub fn from_definitions(defs: Vec<PersonaDefinition>) -> Result<Self> {
        let mut definitions = BTreeMap::new();
        for def in defs {
            if def.system_prompt.trim().is_empty() {
                return Err(Error::config_field_invalid(
                    "system_prompt",
                    format!("persona '{}' has an empty system prompt", def.id),
                ));
            }
            let id = def.id;
            if definitions.insert(id, def).is_some() {
                return Err(Error::config_validation(format!(
                    "persona '{}' is defined more than once",
                    id
                )));
            }
        }

        if let Some(missing) = PersonaId::all()
            .iter()
            .find(|id| !definitions.contains_key(*id))
        {
            return Err(Error::config_validation(format!(
                "persona '{}' has no definition",
                missing
            )));
        }

        Ok(Self { definitions })
    }

    /// The bundled TOML source for a persona.
    pub fn bundled_config(id: PersonaId) -> &'static str {
        match id {
            PersonaId::Strategist => include_str!("../../config/personas/strategist.toml"),
            PersonaId::Technologist => include_str!("../../config/personas/technologist.toml"),
            PersonaId::Impact => include_str!("../../config/personas/impact.toml"),
        }
    }

    pub fn get(&self, id: PersonaId) -> Option<&PersonaDefinition> {
        self.definitions.get(&id)
    }

    /// Map requested identifiers to definitions, preserving request order.
    ///
    /// Fails on the first identifier that is not a known persona, so a
    /// request is either fully resolvable or rejected as a whole.
    pub fn resolve<S: AsRef<str>>(&self, requested: &[S]) -> Result<Vec<&PersonaDefinition>> {
        requested
            .iter()
            .map(|raw| {
                let id: PersonaId = raw.as_ref().parse()?;
                self.get(id).ok_or_else(|| Error::UnknownPersona {
                    persona: raw.as_ref().to_string(),
                    valid: PersonaId::valid_slugs(),
                })
            })
            .collect()
    }

    /// All definitions in presentation order.
    pub fn list(&self) -> impl Iterator<Item = &PersonaDefinition> {
        self.definitions.values()
    }

    pub fn summaries(&self) -> Vec<PersonaSummary> {
        self.list().map(PersonaSummary::from).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
