//! Template store configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Location of the prompt template tree
#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesConfig {
    /// Directory that contains `prompts/`
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("templates")
}
