//! Ollama Provider - Implementation of GenerationService for Ollama-style APIs.
//!
//! Sends `{"model", "prompt", "stream": true}` to a `/api/generate` endpoint
//! and hands the chunked response body back untouched.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OllamaConfig::new("http://localhost:11434/api/generate")
//!     .with_model("mistral")
//!     .with_timeout(Duration::from_secs(300));
//!
//! let provider = OllamaProvider::new(config)?;
//! ```

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;

use crate::ports::{ChunkStream, GenerationRequest, GenerationService, ServiceInfo, TransportError};

/// Configuration for the Ollama provider.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Full generate endpoint URL.
    pub endpoint: String,
    /// Model to use (e.g., "mistral", "llama3").
    pub model: String,
    /// Upper bound for the whole request, including reading the body.
    pub timeout: Duration,
}

impl OllamaConfig {
    /// Creates a configuration for the given endpoint with default model and timeout.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: "mistral".to_string(),
            timeout: Duration::from_secs(300),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Ollama API provider implementation.
pub struct OllamaProvider {
    config: OllamaConfig,
    client: Client,
}

impl OllamaProvider {
    /// Creates a new provider with the given configuration.
    pub fn new(config: OllamaConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Converts our request to the wire format.
    fn to_ollama_request<'a>(&'a self, request: &'a GenerationRequest) -> OllamaRequest<'a> {
        OllamaRequest {
            model: &self.config.model,
            prompt: &request.prompt,
            stream: true,
        }
    }

    /// Maps a reqwest error to a transport error.
    fn map_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::timeout(self.config.timeout.as_secs())
        } else if e.is_connect() {
            TransportError::connect(e.to_string())
        } else {
            TransportError::network(e.to_string())
        }
    }

    /// Sends the streaming request.
    async fn send_streaming_request(
        &self,
        request: &GenerationRequest,
    ) -> Result<Response, TransportError> {
        self.client
            .post(&self.config.endpoint)
            .header("Content-Type", "application/json")
            .json(&self.to_ollama_request(request))
            .send()
            .await
            .map_err(|e| self.map_error(e))
    }

    /// Turns any non-success status into a transport error.
    async fn handle_response_status(&self, response: Response) -> Result<Response, TransportError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %body, "Generation service rejected request");
        Err(TransportError::status(status.as_u16(), body))
    }
}

#[async_trait]
impl GenerationService for OllamaProvider {
    async fn stream_generate(&self, request: GenerationRequest) -> Result<ChunkStream, TransportError> {
        tracing::debug!(
            endpoint = %self.config.endpoint,
            model = %self.config.model,
            prompt_chars = request.prompt.chars().count(),
            "Sending generation request"
        );

        let response = self.send_streaming_request(&request).await?;
        let response = self.handle_response_status(response).await?;

        let timeout_secs = self.config.timeout.as_secs();
        let stream = response.bytes_stream().map(move |chunk| {
            chunk.map_err(|e| {
                if e.is_timeout() {
                    TransportError::timeout(timeout_secs)
                } else {
                    TransportError::stream(e.to_string())
                }
            })
        });

        Ok(Box::pin(stream))
    }

    fn service_info(&self) -> ServiceInfo {
        ServiceInfo::new("ollama", &self.config.model, &self.config.endpoint)
    }
}

// ----- Ollama API Types -----

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}
