//! Mock Generation Service for testing.
//!
//! Provides a scripted implementation of the GenerationService port,
//! allowing tests to run without a real generation server.
//!
//! # Features
//!
//! - Scripted raw chunk sequences (including malformed JSON fragments)
//! - Errors before the stream starts or in the middle of it
//! - Simulated delays for timeout testing
//! - Prompt recording for verification
//!
//! # Example
//!
//! ```ignore
//! let service = MockGenerationService::new()
//!     .with_fragments(["Hel", "lo。"])
//!     .with_delay(Duration::from_millis(100));
//!
//! let stream = service.stream_generate(GenerationRequest::new("hi")).await?;
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{ChunkStream, GenerationRequest, GenerationService, ServiceInfo, TransportError};

/// Mock generation service for testing.
///
/// Responses are consumed in order; once the queue is empty every request
/// gets a single `{"response":"Mock response"}` chunk.
#[derive(Debug, Clone)]
pub struct MockGenerationService {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Service info to return.
    info: ServiceInfo,
    /// Simulated latency before the stream starts.
    delay: Duration,
    /// Prompts received, in order.
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a stream of these chunks.
    Chunks(Vec<MockChunk>),
    /// Fail before any stream is returned.
    Error(TransportError),
}

/// One scripted stream item.
#[derive(Debug, Clone)]
pub enum MockChunk {
    /// Raw bytes delivered as-is.
    Data(Bytes),
    /// Transport error in the middle of the stream.
    Error(TransportError),
}

impl MockChunk {
    /// A chunk carrying `{"response": fragment}`.
    pub fn fragment(fragment: &str) -> Self {
        Self::raw(serde_json::json!({ "response": fragment }).to_string())
    }

    /// A chunk carrying arbitrary text.
    pub fn raw(text: impl Into<String>) -> Self {
        Self::Data(Bytes::from(text.into()))
    }
}

impl Default for MockGenerationService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGenerationService {
    /// Creates a new mock service with default settings.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ServiceInfo::new("mock", "mock-model-1", "mock://generate"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a response made of well-formed `{"response": ...}` chunks.
    pub fn with_fragments<I, S>(self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let chunks = fragments
            .into_iter()
            .map(|f| MockChunk::fragment(f.as_ref()))
            .collect();
        self.with_chunks(chunks)
    }

    /// Queues a response made of raw text chunks, delivered verbatim.
    pub fn with_raw_chunks<I, S>(self, raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let chunks = raw.into_iter().map(MockChunk::raw).collect();
        self.with_chunks(chunks)
    }

    /// Queues a fully scripted chunk sequence.
    pub fn with_chunks(self, chunks: Vec<MockChunk>) -> Self {
        self.push(MockResponse::Chunks(chunks));
        self
    }

    /// Queues a response that streams some fragments and then breaks.
    pub fn with_stream_error_after<I, S>(self, fragments: I, error: TransportError) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut chunks: Vec<MockChunk> = fragments
            .into_iter()
            .map(|f| MockChunk::fragment(f.as_ref()))
            .collect();
        chunks.push(MockChunk::Error(error));
        self.with_chunks(chunks)
    }

    /// Queues a failure before the stream starts (e.g. non-2xx status).
    pub fn with_error(self, error: TransportError) -> Self {
        self.push(MockResponse::Error(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of requests received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns the prompts received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.prompt.clone())
            .collect()
    }

    /// Returns the most recent prompt.
    pub fn last_prompt(&self) -> Option<String> {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|request| request.prompt.clone())
    }

    fn push(&self, response: MockResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    fn next_response(&self) -> MockResponse {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockResponse::Chunks(vec![MockChunk::fragment("Mock response")]))
    }
}

#[async_trait]
impl GenerationService for MockGenerationService {
    async fn stream_generate(&self, request: GenerationRequest) -> Result<ChunkStream, TransportError> {
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Chunks(chunks) => {
                let items = chunks.into_iter().map(|chunk| match chunk {
                    MockChunk::Data(bytes) => Ok(bytes),
                    MockChunk::Error(err) => Err(err),
                });
                Ok(stream::iter(items).boxed())
            }
            MockResponse::Error(err) => Err(err),
        }
    }

    fn service_info(&self) -> ServiceInfo {
        self.info.clone()
    }
}
