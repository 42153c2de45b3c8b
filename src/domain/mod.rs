//! Domain layer containing the conversation engine's types and rules.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (identifiers, state machine trait)
//! - `conversation` - Transcript, modes, prompts and response accumulation

pub mod conversation;
pub mod foundation;
