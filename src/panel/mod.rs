//! Persona panel: render a shared context, ask every selected persona, and
//! collect the answers in request order.

pub mod aggregator;
pub mod context;
pub mod invoker;
pub mod types;

pub use aggregator::PersonaPanel;
pub use context::{render_blueprint, render_history, RenderedContext};
pub use invoker::PersonaInvoker;
pub use types::{ConversationTurn, PanelRequest, PanelResponse, PersonaResponse};
