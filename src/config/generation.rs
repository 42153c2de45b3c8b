//! Generation service configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Where and how to reach the text generation service
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Full URL of the streaming generate endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Upper bound for one whole request, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl GenerationConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate generation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ValidationError::InvalidEndpoint);
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("generation.model"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 3600 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:11434/api/generate".to_string()
}

fn default_model() -> String {
    "mistral".to_string()
}

fn default_timeout() -> u64 {
    300
}
