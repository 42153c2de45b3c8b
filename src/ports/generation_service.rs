//! Generation Service Port - Interface for the text generation backend.
//!
//! This port abstracts the streaming HTTP call to a locally hosted
//! generation service, so the conversation engine can be driven by a real
//! server or by a scripted test double.
//!
//! # Design
//!
//! - One request shape: a prompt, answered as a stream
//! - The stream yields raw byte chunks exactly as the transport delivered
//!   them; decoding belongs to the response accumulator
//! - Transport failures (connect, timeout, non-2xx, broken body) are the only
//!   errors this port reports
//!
//! # Example
//!
//! ```ignore
//! let stream = service.stream_generate(GenerationRequest::new(prompt)).await?;
//! let reply = StreamingResponseAccumulator::new("。").accumulate(stream).await?;
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Stream of raw response chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Port for the text generation service.
///
/// Implementations own the endpoint and model selection; callers only
/// supply the prompt.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Starts a streaming generation.
    ///
    /// Fails before returning a stream if the request cannot be sent or the
    /// service answers with a non-success status. Errors while reading the
    /// body are yielded through the stream.
    async fn stream_generate(&self, request: GenerationRequest) -> Result<ChunkStream, TransportError>;

    /// Describes the backing service (for logging).
    fn service_info(&self) -> ServiceInfo;
}

/// Request for one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Full prompt text.
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Generation service information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Service name (e.g., "ollama").
    pub name: String,
    /// Model identifier (e.g., "mistral").
    pub model: String,
    /// Endpoint the requests are sent to.
    pub endpoint: String,
}

impl ServiceInfo {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            endpoint: endpoint.into(),
        }
    }
}

/// Transport-level failures.
///
/// Any of these aborts the current request without a reply. None of them
/// make the engine unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Could not reach the service.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The service answered with a non-success status.
    #[error("service returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, if it could be read.
        body: String,
    },

    /// The request did not finish in time.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// The response body broke off while streaming.
    #[error("stream error: {0}")]
    Stream(String),

    /// Any other network error.
    #[error("network error: {0}")]
    Network(String),
}

impl TransportError {
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect(message.into())
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn timeout(timeout_secs: u64) -> Self {
        Self::Timeout { timeout_secs }
    }

    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Returns true if trying again later could succeed.
    ///
    /// The engine never retries on its own; this is for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Connect(_)
            | TransportError::Timeout { .. }
            | TransportError::Stream(_)
            | TransportError::Network(_) => true,
            TransportError::Status { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_retryable_classification() {
        assert!(TransportError::connect("refused").is_retryable());
        assert!(TransportError::timeout(300).is_retryable());
        assert!(TransportError::stream("reset").is_retryable());
        assert!(TransportError::status(503, "").is_retryable());
        assert!(TransportError::status(429, "").is_retryable());

        assert!(!TransportError::status(404, "model not found").is_retryable());
        assert!(!TransportError::status(400, "bad request").is_retryable());
    }

    #[test]
    fn transport_error_displays_correctly() {
        assert_eq!(
            TransportError::status(404, "model 'x' not found").to_string(),
            "service returned status 404: model 'x' not found"
        );
        assert_eq!(
            TransportError::timeout(300).to_string(),
            "request timed out after 300s"
        );
    }

    #[test]
    fn service_info_holds_fields() {
        let info = ServiceInfo::new("ollama", "mistral", "http://localhost:11434/api/generate");
        assert_eq!(info.name, "ollama");
        assert_eq!(info.model, "mistral");
        assert_eq!(info.endpoint, "http://localhost:11434/api/generate");
    }
}
