//! Configuration error types

use thiserror::Error;

use crate::domain::conversation::ModeConfigError;
use crate::ports::TemplateStoreError;

/// Errors that can occur while loading configuration or building a mode
///
/// All of these are fatal at construction time: the caller must not start
/// a conversation on top of them.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    #[error("Template files unavailable for mode '{mode}': {source}")]
    TemplateUnavailable {
        mode: String,
        #[source]
        source: TemplateStoreError,
    },

    #[error("Invalid mode: {0}")]
    InvalidMode(#[from] ModeConfigError),
}

impl ConfigError {
    pub fn template_unavailable(mode: impl Into<String>, source: TemplateStoreError) -> Self {
        Self::TemplateUnavailable {
            mode: mode.into(),
            source,
        }
    }
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Generation endpoint must be an http(s) URL")]
    InvalidEndpoint,

    #[error("Invalid request timeout (expected 1..=3600 seconds)")]
    InvalidTimeout,

    #[error("Invalid auto-conversation interval (expected 1..=10 seconds)")]
    InvalidAutoInterval,

    #[error("Default mode '{0}' is not defined")]
    UnknownDefaultMode(String),

    #[error("Mode '{0}' has an empty end marker")]
    EmptyEndMarker(String),

    #[error("Mode id '{0}' must only contain letters, digits, '_' or '-'")]
    InvalidModeId(String),
}
