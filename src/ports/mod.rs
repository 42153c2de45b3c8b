//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the conversation engine and the outside world. Adapters implement these
//! ports.
//!
//! - `GenerationService` - Streaming call to the text generation backend
//! - `TemplateRepository` - Prompt templates and seed lines per mode

mod generation_service;
mod template_repository;

pub use generation_service::{
    ChunkStream, GenerationRequest, GenerationService, ServiceInfo, TransportError,
};
pub use template_repository::{
    validate_mode_id, TemplateRecord, TemplateRepository, TemplateStoreError,
};
