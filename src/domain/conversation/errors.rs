//! Error types for prompt templates and mode definitions.

use thiserror::Error;

/// Placeholder substitution failed.
///
/// Not retryable: the same template fails the same way on every call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Template is empty")]
    Empty,

    #[error("Unknown placeholder '{{{name}}}' at byte {position}")]
    UnknownPlaceholder { name: String, position: usize },

    #[error("Malformed template at byte {position}: {reason}")]
    Malformed { position: usize, reason: &'static str },
}

impl TemplateError {
    pub fn unknown_placeholder(name: impl Into<String>, position: usize) -> Self {
        Self::UnknownPlaceholder {
            name: name.into(),
            position,
        }
    }

    pub fn malformed(position: usize, reason: &'static str) -> Self {
        Self::Malformed { position, reason }
    }
}

/// A mode definition cannot be turned into a usable `ModeConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeConfigError {
    #[error("Mode id cannot be empty")]
    EmptyId,

    #[error("Mode '{0}' has an empty end marker")]
    EmptyEndMarker(String),

    #[error("Mode '{mode}' has an invalid prompt template: {source}")]
    InvalidTemplate {
        mode: String,
        #[source]
        source: TemplateError,
    },
}
