//! Generation Service Adapters.
//!
//! Implementations of the GenerationService port.
//!
//! ## Available Adapters
//!
//! - `OllamaProvider` - Ollama-style `/api/generate` streaming endpoint
//! - `MockGenerationService` - Scripted chunk streams for testing

mod mock_provider;
mod ollama_provider;

pub use mock_provider::{MockChunk, MockGenerationService, MockResponse};
pub use ollama_provider::{OllamaConfig, OllamaProvider};
