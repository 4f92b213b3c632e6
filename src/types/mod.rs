//! Type definitions shared between the panel and the generation backends.

mod generation;

pub use generation::*;
