//! Builds validated `ModeConfig`s from configuration and the template store.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{AppConfig, ConfigError, ModeDefinition};
use crate::domain::conversation::{MessageGenerator, ModeConfig};
use crate::ports::TemplateRepository;

/// Resolves mode ids into ready-to-use mode configurations.
///
/// Templates are read on every `load`, so edits saved through the template
/// store show up the next time a mode is loaded.
pub struct ModeLoader<T>
where
    T: TemplateRepository + ?Sized,
{
    repository: Arc<T>,
    modes: HashMap<String, ModeDefinition>,
}

impl<T> ModeLoader<T>
where
    T: TemplateRepository + ?Sized,
{
    pub fn new(repository: Arc<T>, modes: HashMap<String, ModeDefinition>) -> Self {
        Self { repository, modes }
    }

    pub fn from_config(repository: Arc<T>, config: &AppConfig) -> Self {
        Self::new(repository, config.modes.clone())
    }

    pub fn repository(&self) -> &Arc<T> {
        &self.repository
    }

    /// Configured mode ids, sorted.
    pub fn list_modes(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.modes.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Loads a mode's template and seed lines and validates the result.
    ///
    /// # Errors
    ///
    /// - `UnknownMode` if the id is not configured
    /// - `TemplateUnavailable` if the template or seed file cannot be read
    /// - `InvalidMode` if the template is malformed or the mode is otherwise invalid
    pub async fn load(&self, mode_id: &str) -> Result<ModeConfig, ConfigError> {
        let definition = self
            .modes
            .get(mode_id)
            .ok_or_else(|| ConfigError::UnknownMode(mode_id.to_string()))?;

        let template = self
            .repository
            .load_template(mode_id)
            .await
            .map_err(|e| ConfigError::template_unavailable(mode_id, e))?;
        let seed_lines = self
            .repository
            .load_seed_lines(mode_id)
            .await
            .map_err(|e| ConfigError::template_unavailable(mode_id, e))?;

        let display_name = definition.display_name.as_deref().unwrap_or(mode_id);
        let seed_count = seed_lines.len();
        let mut mode = ModeConfig::new(
            mode_id,
            display_name,
            template,
            seed_lines,
            definition.end_marker.as_str(),
        )?;
        if let Some(kind) = definition.message_generator {
            mode = mode.with_message_generator(MessageGenerator::from_kind(kind));
        }

        tracing::debug!(mode = %mode_id, seeds = seed_count, "Mode loaded");
        Ok(mode)
    }
}
