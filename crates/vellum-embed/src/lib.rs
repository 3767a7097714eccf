//! Embedding model abstraction: one loaded model per service, injected at startup.

pub mod error;
#[cfg(feature = "mock")]
pub mod mock;
pub mod ollama;
pub mod service;

pub use error::EmbedError;
#[cfg(feature = "mock")]
pub use mock::MockEmbedder;
pub use ollama::OllamaEmbedder;
pub use service::{EmbeddingModel, EmbeddingService};
