//! Chat session configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::conversation::SpeakerLabels;

/// Labels, starting mode and auto-conversation pacing
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_user_label")]
    pub user_label: String,

    #[serde(default = "default_bot_label")]
    pub bot_label: String,

    /// Mode the session starts in
    #[serde(default = "default_mode")]
    pub default_mode: String,

    /// Pause between automatic turns, in seconds
    #[serde(default = "default_auto_interval")]
    pub auto_interval_secs: u64,
}

impl ChatConfig {
    pub fn labels(&self) -> SpeakerLabels {
        SpeakerLabels::new(&self.user_label, &self.bot_label)
    }

    pub fn auto_interval(&self) -> Duration {
        Duration::from_secs(self.auto_interval_secs)
    }

    /// Validate chat configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_label.trim().is_empty() {
            return Err(ValidationError::MissingRequired("chat.user_label"));
        }
        if self.bot_label.trim().is_empty() {
            return Err(ValidationError::MissingRequired("chat.bot_label"));
        }
        if !(1..=10).contains(&self.auto_interval_secs) {
            return Err(ValidationError::InvalidAutoInterval);
        }
        Ok(())
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            user_label: default_user_label(),
            bot_label: default_bot_label(),
            default_mode: default_mode(),
            auto_interval_secs: default_auto_interval(),
        }
    }
}

fn default_user_label() -> String {
    "User".to_string()
}

fn default_bot_label() -> String {
    "Bot".to_string()
}

fn default_mode() -> String {
    "normal".to_string()
}

fn default_auto_interval() -> u64 {
    5
}
