use std::path::Path;

use serde_json::Value;
use vellum_embed::EmbeddingService;

use crate::chunker::TextChunker;
use crate::error::IngestError;
use crate::processor::ProcessorFactory;
use crate::types::{Metadata, ProcessedDocument};

/// Orchestrates extraction, chunking, and embedding for one file at a time:
/// every step is a hard dependency on the previous one succeeding, and any
/// failure aborts the whole file with no partial result.
pub struct DocumentPipeline {
    factory: ProcessorFactory,
    chunker: TextChunker,
    embeddings: EmbeddingService,
}

impl DocumentPipeline {
    #[must_use]
    pub fn new(factory: ProcessorFactory, chunker: TextChunker, embeddings: EmbeddingService) -> Self {
        Self {
            factory,
            chunker,
            embeddings,
        }
    }

    /// Process a saved file: resolve a processor from the declared filename's
    /// extension, extract text, chunk it, embed every chunk, and return the
    /// assembled document for storage hand-off.
    ///
    /// Caller-supplied `extra_metadata` is merged into the base envelope and
    /// wins on key collisions.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::UnsupportedFileType`] for unknown extensions,
    /// and propagates extraction and embedding failures without retrying.
    pub async fn process_file(
        &self,
        file_path: &Path,
        filename: &str,
        extra_metadata: Option<Metadata>,
    ) -> Result<ProcessedDocument, IngestError> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .ok_or_else(|| IngestError::UnsupportedFileType(filename.to_owned()))?;

        let processor = self.factory.resolve(extension)?;

        let mut metadata = Metadata::new();
        metadata.insert("filename".to_owned(), Value::from(filename));
        metadata.insert(
            "file_type".to_owned(),
            Value::from(extension.to_ascii_lowercase()),
        );
        metadata.insert(
            "processed_at".to_owned(),
            Value::from(chrono::Utc::now().to_rfc3339()),
        );
        if let Some(extra) = extra_metadata {
            for (key, value) in extra {
                metadata.insert(key, value);
            }
        }

        tracing::info!(filename, "extracting text");
        let text = processor.extract_text(file_path).await.map_err(|e| {
            tracing::error!(filename, "text extraction failed: {e}");
            e
        })?;

        let chunks = self.chunker.chunk_text(&text, &metadata);
        if chunks.is_empty() {
            tracing::info!(filename, "no chunks produced");
            return Ok(ProcessedDocument {
                chunks,
                metadata,
            });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embeddings.get_embeddings(&texts).await.map_err(|e| {
            tracing::error!(filename, "embedding failed: {e}");
            e
        })?;

        let chunks = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| chunk.with_embedding(vector))
            .collect::<Vec<_>>();

        tracing::info!(filename, chunks = chunks.len(), "document processed");
        Ok(ProcessedDocument { chunks, metadata })
    }
}
