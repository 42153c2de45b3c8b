//! Template Repository Port - Source of prompt templates and seed lines.
//!
//! Each mode id owns one prompt template and one seed-line list. The engine
//! only reads them when a mode is constructed; edits made through
//! `save_template` are picked up by the next construction, never mid-session.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Port for prompt template and seed line storage.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Reads the prompt template text for a mode.
    ///
    /// # Errors
    ///
    /// Returns `TemplateStoreError::NotFound` if the mode has no template.
    async fn load_template(&self, mode_id: &str) -> Result<String, TemplateStoreError>;

    /// Reads the seed lines for a mode: trimmed, blank lines removed.
    ///
    /// # Errors
    ///
    /// Returns `TemplateStoreError::NotFound` if the mode has no seed file.
    async fn load_seed_lines(&self, mode_id: &str) -> Result<Vec<String>, TemplateStoreError>;

    /// Replaces a mode's template.
    ///
    /// Implementations validate the content first and keep a backup of every
    /// saved version.
    async fn save_template(&self, template: &TemplateRecord) -> Result<(), TemplateStoreError>;

    /// Removes a mode's template. Returns `false` if there was none.
    async fn delete_template(&self, mode_id: &str) -> Result<bool, TemplateStoreError>;

    /// Lists the mode ids that currently have a template, sorted.
    async fn list_modes(&self) -> Result<Vec<String>, TemplateStoreError>;
}

/// A prompt template as handed to the editor and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRecord {
    /// Mode the template belongs to.
    pub mode_id: String,
    /// Template text.
    pub content: String,
    /// Free-form description shown in the editor.
    pub description: String,
    /// Version label used in backup file names.
    pub version: String,
    /// When the template was last written.
    pub last_modified: DateTime<Utc>,
}

impl TemplateRecord {
    /// Creates a record with version `1.0.0` and the current time.
    pub fn new(mode_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            mode_id: mode_id.into(),
            content: content.into(),
            description: String::new(),
            version: "1.0.0".to_string(),
            last_modified: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Name under which backups are grouped.
    pub fn name(&self) -> String {
        format!("{}_template", self.mode_id)
    }
}

/// Errors from template storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateStoreError {
    /// Mode id is not a plain path segment.
    #[error("Invalid mode id: {0}")]
    InvalidModeId(String),

    /// The requested file does not exist.
    #[error("{what} not found for mode '{mode_id}'")]
    NotFound { mode_id: String, what: &'static str },

    /// Template content failed validation and was not saved.
    #[error("Invalid template content: {0}")]
    InvalidContent(String),

    /// Underlying storage failed.
    #[error("IO error: {0}")]
    Io(String),
}

impl TemplateStoreError {
    pub fn not_found(mode_id: impl Into<String>, what: &'static str) -> Self {
        Self::NotFound {
            mode_id: mode_id.into(),
            what,
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }
}

/// Checks that a mode id is a single safe path segment (`[A-Za-z0-9_-]+`).
pub fn validate_mode_id(mode_id: &str) -> Result<(), TemplateStoreError> {
    let valid = !mode_id.is_empty()
        && mode_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(TemplateStoreError::InvalidModeId(mode_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_builder_sets_fields() {
        let record = TemplateRecord::new("normal", "{history}")
            .with_description("default")
            .with_version("2.1.0");

        assert_eq!(record.mode_id, "normal");
        assert_eq!(record.content, "{history}");
        assert_eq!(record.description, "default");
        assert_eq!(record.version, "2.1.0");
        assert_eq!(record.name(), "normal_template");
    }

    #[test]
    fn mode_id_validation() {
        assert!(validate_mode_id("normal").is_ok());
        assert!(validate_mode_id("my-mode_2").is_ok());

        assert!(validate_mode_id("").is_err());
        assert!(validate_mode_id("../etc").is_err());
        assert!(validate_mode_id("a/b").is_err());
        assert!(validate_mode_id("with space").is_err());
    }

    #[test]
    fn not_found_displays_what_is_missing() {
        let err = TemplateStoreError::not_found("custom", "Seed lines");
        assert_eq!(err.to_string(), "Seed lines not found for mode 'custom'");
    }
}
