//! Document processing pipeline: format-specific extraction, overlapping
//! chunking with metadata propagation, and embedding orchestration.

pub mod chunker;
pub mod error;
pub mod pipeline;
pub mod processor;
pub mod store;
pub mod types;

pub use chunker::{ChunkerConfig, TextChunker};
pub use error::IngestError;
pub use pipeline::DocumentPipeline;
pub use processor::{DocumentProcessor, ProcessorFactory};
pub use store::{DocumentStore, InMemoryDocumentStore, StoreError};
pub use types::{DocumentChunk, DocumentType, Metadata, ProcessedDocument};

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
