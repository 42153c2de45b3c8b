//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, the state machine trait and the error types
//! that the conversation engine builds on.

mod errors;
mod ids;
mod state_machine;

pub use errors::InvalidTransition;
pub use ids::SessionId;
pub use state_machine::StateMachine;
