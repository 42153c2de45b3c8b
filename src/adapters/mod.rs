//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Generation service clients (Ollama, mock)
//! - `templates` - Prompt template and seed line storage

pub mod ai;
pub mod templates;

pub use ai::{MockGenerationService, OllamaConfig, OllamaProvider};
pub use templates::{FileTemplateStore, InMemoryTemplateStore};
