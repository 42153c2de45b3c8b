//! In-Memory Template Store
//!
//! Keeps templates and seed lines in memory.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::{parse_seed_lines, PromptTemplate};
use crate::ports::{validate_mode_id, TemplateRecord, TemplateRepository, TemplateStoreError};

/// In-memory storage for templates, seed lines and saved versions.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateStore {
    templates: Arc<RwLock<HashMap<String, String>>>,
    seeds: Arc<RwLock<HashMap<String, Vec<String>>>>,
    history: Arc<RwLock<Vec<TemplateRecord>>>,
}

impl InMemoryTemplateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a mode directly, bypassing validation (useful for tests)
    pub async fn insert_mode(&self, mode_id: &str, template: &str, seed_text: &str) {
        self.templates
            .write()
            .await
            .insert(mode_id.to_string(), template.to_string());
        self.seeds
            .write()
            .await
            .insert(mode_id.to_string(), parse_seed_lines(seed_text));
    }

    /// Every record accepted by `save_template`, in order
    pub async fn saved_versions(&self) -> Vec<TemplateRecord> {
        self.history.read().await.clone()
    }
}

#[async_trait]
impl TemplateRepository for InMemoryTemplateStore {
    async fn load_template(&self, mode_id: &str) -> Result<String, TemplateStoreError> {
        self.templates
            .read()
            .await
            .get(mode_id)
            .cloned()
            .ok_or_else(|| TemplateStoreError::not_found(mode_id, "Prompt template"))
    }

    async fn load_seed_lines(&self, mode_id: &str) -> Result<Vec<String>, TemplateStoreError> {
        self.seeds
            .read()
            .await
            .get(mode_id)
            .cloned()
            .ok_or_else(|| TemplateStoreError::not_found(mode_id, "Seed lines"))
    }

    async fn save_template(&self, template: &TemplateRecord) -> Result<(), TemplateStoreError> {
        validate_mode_id(&template.mode_id)?;
        PromptTemplate::validate(&template.content)
            .map_err(|e| TemplateStoreError::InvalidContent(e.to_string()))?;

        self.templates
            .write()
            .await
            .insert(template.mode_id.clone(), template.content.clone());
        self.history.write().await.push(template.clone());
        Ok(())
    }

    async fn delete_template(&self, mode_id: &str) -> Result<bool, TemplateStoreError> {
        Ok(self.templates.write().await.remove(mode_id).is_some())
    }

    async fn list_modes(&self) -> Result<Vec<String>, TemplateStoreError> {
        let mut modes: Vec<String> = self.templates.read().await.keys().cloned().collect();
        modes.sort();
        Ok(modes)
    }
}
