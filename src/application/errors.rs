//! Application-level error types.

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::conversation::TemplateError;
use crate::ports::TransportError;

/// Errors from a single engine operation.
///
/// None of these leave the engine unusable; the next call starts clean.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The mode template could not be rendered.
    #[error("Prompt template error: {0}")]
    Template(#[from] TemplateError),

    /// The generation request failed or timed out.
    #[error("Generation failed: {0}")]
    Transport(#[from] TransportError),

    /// `generate_next` was called on a mode without seed lines.
    #[error("Mode '{0}' has no seed lines")]
    EmptySeedSet(String),
}

impl EngineError {
    /// True for transport failures worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Transport(err) if err.is_retryable())
    }
}

/// Errors surfaced by a chat session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_convert_and_classify() {
        let err: EngineError = TransportError::timeout(5).into();
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "Generation failed: request timed out after 5s");

        let err: EngineError = TransportError::status(404, "no model").into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn seed_and_template_errors_are_not_retryable() {
        assert!(!EngineError::EmptySeedSet("custom".to_string()).is_retryable());
        assert!(!EngineError::Template(TemplateError::Empty).is_retryable());
    }

    #[test]
    fn session_error_is_transparent() {
        let err: SessionError = EngineError::EmptySeedSet("custom".to_string()).into();
        assert_eq!(err.to_string(), "Mode 'custom' has no seed lines");
    }
}
