//! Generation backends
//!
//! The `GenerationBackend` abstraction plus the OpenAI-compatible client used
//! in production and the mock used by tests.

mod mock;
mod openai;
mod traits;

pub use mock::{MockBackend, MockConfig};
pub use openai::{OpenAiBackend, OpenAiConfig};
pub use traits::*;
