//! Persona Panel - multi-persona advisory service
//!
//! A user message, an optional blueprint document and the conversation so far
//! are fanned out to a fixed panel of advisory personas. Each persona is one
//! call to an OpenAI-compatible chat completions API with its own system
//! prompt; the answers come back together, in the order they were asked for.
//!
//! The crate is usable as a library (see [`panel::PersonaPanel`] and
//! [`server::app_router`]) and ships the `persona-panel` binary.

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod panel;
pub mod persona;
pub mod server;
pub mod types;
pub mod version;

pub use error::{Error, ErrorCode, Result};

/// Crate version, as reported by `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
