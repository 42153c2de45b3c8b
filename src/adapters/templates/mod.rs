//! Template Store Adapters
//!
//! Implementations of the TemplateRepository port.
//!
//! ## Available Adapters
//!
//! - **FileTemplateStore** - Per-mode text files with timestamped backups
//! - **InMemoryTemplateStore** - In-memory maps (testing/development)

mod file_template_store;
mod in_memory_template_store;

pub use file_template_store::FileTemplateStore;
pub use in_memory_template_store::InMemoryTemplateStore;
