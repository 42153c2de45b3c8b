//! Application layer - Engine and session orchestration.
//!
//! This layer drives the domain through the ports:
//! - `ConversationEngine` - one conversation against a generation service
//! - `ModeLoader` - builds modes from configuration and the template store
//! - `ChatSession` - a lock around one engine for shared use

mod chat_session;
mod engine;
mod errors;
mod mode_loader;

pub use chat_session::{AutoTurn, ChatSession};
pub use engine::{ConversationEngine, EngineOptions, Reply};
pub use errors::{EngineError, SessionError};
pub use mode_loader::ModeLoader;
