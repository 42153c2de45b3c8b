//! Local Chat - Conversational client for locally hosted text generation
//!
//! This crate keeps a running transcript, turns it into prompts for a
//! streaming generation service, and reads the streamed reply until a
//! mode-specific end marker shows up.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
