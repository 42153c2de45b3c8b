//! Mode definitions
//!
//! The template text and seed lines of a mode live in the template store;
//! configuration only names the mode and sets its response handling.

use serde::Deserialize;
use std::collections::HashMap;

use super::error::ValidationError;
use crate::domain::conversation::GeneratorKind;
use crate::ports::validate_mode_id;

/// Static settings for one conversation mode
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ModeDefinition {
    /// Human-readable name; defaults to the mode id
    #[serde(default)]
    pub display_name: Option<String>,

    /// Substring that ends a streamed reply
    pub end_marker: String,

    /// How `generate_next` turns a seed line into a message
    #[serde(default)]
    pub message_generator: Option<GeneratorKind>,
}

impl ModeDefinition {
    pub fn new(end_marker: impl Into<String>) -> Self {
        Self {
            display_name: None,
            end_marker: end_marker.into(),
            message_generator: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_generator(mut self, kind: GeneratorKind) -> Self {
        self.message_generator = Some(kind);
        self
    }
}

/// The built-in `normal` and `custom` modes.
pub fn default_modes() -> HashMap<String, ModeDefinition> {
    HashMap::from([
        (
            "normal".to_string(),
            ModeDefinition::new("」")
                .with_display_name("Normal")
                .with_generator(GeneratorKind::Identity),
        ),
        (
            "custom".to_string(),
            ModeDefinition::new("。").with_display_name("Custom"),
        ),
    ])
}

pub(super) fn validate_modes(
    modes: &HashMap<String, ModeDefinition>,
) -> Result<(), ValidationError> {
    for (id, definition) in modes {
        if validate_mode_id(id).is_err() {
            return Err(ValidationError::InvalidModeId(id.clone()));
        }
        if definition.end_marker.is_empty() {
            return Err(ValidationError::EmptyEndMarker(id.clone()));
        }
    }
    Ok(())
}
