//! Application configuration module
//!
//! This module provides type-safe configuration loading using the `config`
//! and `dotenvy` crates. Values come from an optional TOML file and from
//! environment variables with the `LOCAL_CHAT` prefix; nested values use
//! double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use local_chat::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Talking to {}", config.generation.endpoint);
//! ```

mod chat;
mod error;
mod generation;
mod logging;
mod modes;
mod templates;

pub use chat::ChatConfig;
pub use error::{ConfigError, ValidationError};
pub use generation::GenerationConfig;
pub use logging::LoggingConfig;
pub use modes::{default_modes, ModeDefinition};
pub use templates::TemplatesConfig;

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "LOCAL_CHAT_CONFIG";

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// setup against a local Ollama server.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Generation service endpoint, model and timeout
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Speaker labels, starting mode, auto-conversation pacing
    #[serde(default)]
    pub chat: ChatConfig,

    /// Template store location
    #[serde(default)]
    pub templates: TemplatesConfig,

    /// Known modes; defining any replaces the built-in set
    #[serde(default = "default_modes")]
    pub modes: HashMap<String, ModeDefinition>,

    /// Tracing subscriber settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads the file named by `LOCAL_CHAT_CONFIG`, or `local-chat.toml`
    ///    in the working directory if it exists
    /// 3. Reads environment variables with `LOCAL_CHAT` prefix
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `LOCAL_CHAT__GENERATION__MODEL=llama3` -> `generation.model = "llama3"`
    /// - `LOCAL_CHAT__CHAT__BOT_LABEL=Aoi` -> `chat.bot_label = "Aoi"`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an explicit config file is missing or
    /// values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let file_source = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => config::File::from(PathBuf::from(path)).required(true),
            Err(_) => config::File::with_name("local-chat").required(false),
        };

        let config = config::Config::builder()
            .add_source(file_source)
            .add_source(
                config::Environment::default()
                    .prefix("LOCAL_CHAT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.generation.validate()?;
        self.chat.validate()?;
        modes::validate_modes(&self.modes)?;
        if !self.modes.contains_key(&self.chat.default_mode) {
            return Err(ValidationError::UnknownDefaultMode(
                self.chat.default_mode.clone(),
            ));
        }
        Ok(())
    }

    /// Mode ids known to configuration, sorted
    pub fn mode_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.modes.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            chat: ChatConfig::default(),
            templates: TemplatesConfig::default(),
            modes: default_modes(),
            logging: LoggingConfig::default(),
        }
    }
}
