//! Persona system: the fixed advisory roles a panel request can consult.
//!
//! Each persona pairs display metadata with the system prompt that biases a
//! single generation call toward that role's perspective.

pub mod registry;
pub mod types;

pub use registry::PersonaRegistry;
pub use types::{PersonaDefinition, PersonaId, PersonaSummary};
