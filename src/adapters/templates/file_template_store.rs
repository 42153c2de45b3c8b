//! File Template Store - Implementation of TemplateRepository on the local filesystem.
//!
//! Templates and seed lines live next to each other per mode, and every save
//! leaves a timestamped copy in a backup directory.

use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::conversation::{parse_seed_lines, PromptTemplate};
use crate::ports::{validate_mode_id, TemplateRecord, TemplateRepository, TemplateStoreError};

const TEMPLATE_FILE: &str = "prompt_template.txt";
const SEED_FILE: &str = "default_you_lines.txt";
const BACKUP_DIR: &str = "backups";

/// Filesystem-backed template storage.
///
/// # Directory Structure
///
/// ```text
/// {root}/prompts/
/// ├── normal/
/// │   ├── prompt_template.txt
/// │   └── default_you_lines.txt
/// ├── custom/
/// │   └── ...
/// └── backups/
///     └── normal_template/
///         └── 20240501_093000_v1.0.0.txt
/// ```
///
/// Writes go to `prompt_template.txt.tmp` first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileTemplateStore {
    prompts_dir: PathBuf,
}

impl FileTemplateStore {
    /// Creates a store rooted at `root`; files are kept under `{root}/prompts`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            prompts_dir: root.as_ref().join("prompts"),
        }
    }

    fn mode_dir(&self, mode_id: &str) -> PathBuf {
        self.prompts_dir.join(mode_id)
    }

    fn template_path(&self, mode_id: &str) -> PathBuf {
        self.mode_dir(mode_id).join(TEMPLATE_FILE)
    }

    fn seed_path(&self, mode_id: &str) -> PathBuf {
        self.mode_dir(mode_id).join(SEED_FILE)
    }

    fn backup_dir(&self, record: &TemplateRecord) -> PathBuf {
        self.prompts_dir.join(BACKUP_DIR).join(record.name())
    }

    /// Lists backup files for a mode, oldest first.
    pub async fn list_backups(&self, mode_id: &str) -> Result<Vec<PathBuf>, TemplateStoreError> {
        validate_mode_id(mode_id)?;
        let dir = self
            .prompts_dir
            .join(BACKUP_DIR)
            .join(format!("{}_template", mode_id));

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(TemplateStoreError::io(format!(
                    "Failed to read backup directory {}: {}",
                    dir.display(),
                    e
                )))
            }
        };

        let mut backups = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| TemplateStoreError::io(format!("Failed to read directory entry: {}", e)))?
        {
            backups.push(entry.path());
        }
        backups.sort();
        Ok(backups)
    }

    async fn read_file(
        &self,
        path: &Path,
        mode_id: &str,
        what: &'static str,
    ) -> Result<String, TemplateStoreError> {
        fs::read_to_string(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => TemplateStoreError::not_found(mode_id, what),
            _ => TemplateStoreError::io(format!("Failed to read {}: {}", path.display(), e)),
        })
    }

    /// Versions end up in backup file names, so they must be a single plain segment.
    fn validate_version(version: &str) -> Result<(), TemplateStoreError> {
        let plain = !version.is_empty()
            && version
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            && !version.contains("..");
        if plain {
            Ok(())
        } else {
            Err(TemplateStoreError::InvalidContent(format!(
                "Invalid template version '{}'",
                version
            )))
        }
    }

    async fn ensure_dir(dir: &Path) -> Result<(), TemplateStoreError> {
        fs::create_dir_all(dir).await.map_err(|e| {
            TemplateStoreError::io(format!("Failed to create directory {}: {}", dir.display(), e))
        })
    }

    async fn write_atomic(path: &Path, content: &str) -> Result<(), TemplateStoreError> {
        let temp_path = path.with_extension("txt.tmp");

        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            TemplateStoreError::io(format!(
                "Failed to create temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;
        file.write_all(content.as_bytes()).await.map_err(|e| {
            TemplateStoreError::io(format!("Failed to write {}: {}", temp_path.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            TemplateStoreError::io(format!("Failed to sync {}: {}", temp_path.display(), e))
        })?;

        fs::rename(&temp_path, path).await.map_err(|e| {
            TemplateStoreError::io(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl TemplateRepository for FileTemplateStore {
    async fn load_template(&self, mode_id: &str) -> Result<String, TemplateStoreError> {
        validate_mode_id(mode_id)?;
        self.read_file(&self.template_path(mode_id), mode_id, "Prompt template")
            .await
    }

    async fn load_seed_lines(&self, mode_id: &str) -> Result<Vec<String>, TemplateStoreError> {
        validate_mode_id(mode_id)?;
        let text = self
            .read_file(&self.seed_path(mode_id), mode_id, "Seed lines")
            .await?;
        Ok(parse_seed_lines(&text))
    }

    async fn save_template(&self, template: &TemplateRecord) -> Result<(), TemplateStoreError> {
        validate_mode_id(&template.mode_id)?;
        Self::validate_version(&template.version)?;
        PromptTemplate::validate(&template.content)
            .map_err(|e| TemplateStoreError::InvalidContent(e.to_string()))?;

        let backup_dir = self.backup_dir(template);
        Self::ensure_dir(&backup_dir).await?;
        let backup_path = backup_dir.join(format!(
            "{}_v{}.txt",
            Utc::now().format("%Y%m%d_%H%M%S"),
            template.version
        ));
        fs::write(&backup_path, &template.content).await.map_err(|e| {
            TemplateStoreError::io(format!(
                "Failed to write backup {}: {}",
                backup_path.display(),
                e
            ))
        })?;

        let mode_dir = self.mode_dir(&template.mode_id);
        Self::ensure_dir(&mode_dir).await?;
        Self::write_atomic(&self.template_path(&template.mode_id), &template.content).await?;

        tracing::info!(
            mode = %template.mode_id,
            version = %template.version,
            backup = %backup_path.display(),
            "Prompt template saved"
        );
        Ok(())
    }

    async fn delete_template(&self, mode_id: &str) -> Result<bool, TemplateStoreError> {
        validate_mode_id(mode_id)?;
        let path = self.template_path(mode_id);

        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(TemplateStoreError::io(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn list_modes(&self) -> Result<Vec<String>, TemplateStoreError> {
        let mut entries = match fs::read_dir(&self.prompts_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(TemplateStoreError::io(format!(
                    "Failed to read {}: {}",
                    self.prompts_dir.display(),
                    e
                )))
            }
        };

        let mut modes = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| TemplateStoreError::io(format!("Failed to read directory entry: {}", e)))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == BACKUP_DIR || validate_mode_id(&name).is_err() {
                continue;
            }
            if fs::metadata(entry.path().join(TEMPLATE_FILE)).await.is_ok() {
                modes.push(name);
            }
        }
        modes.sort();
        Ok(modes)
    }
}
