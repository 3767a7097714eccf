use std::fmt;

/// Ordered string-keyed envelope propagated from document level down to each
/// chunk. Values are JSON scalars.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Supported document formats, keyed by lowercase file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Pdf,
    Txt,
    Docx,
    Md,
}

impl DocumentType {
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Txt),
            "docx" => Some(Self::Docx),
            "md" => Some(Self::Md),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Txt => "txt",
            Self::Docx => "docx",
            Self::Md => "md",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A text segment with its own metadata copy and, once computed, its
/// embedding vector. Not mutated after creation; the embedding is attached
/// via the consuming [`DocumentChunk::with_embedding`].
#[derive(Debug, Clone)]
pub struct DocumentChunk {
    pub text: String,
    pub metadata: Metadata,
    pub embedding: Option<Vec<f32>>,
}

impl DocumentChunk {
    #[must_use]
    pub fn new(text: String, metadata: Metadata) -> Self {
        Self {
            text,
            metadata,
            embedding: None,
        }
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// A fully processed document: ordered chunks plus the base metadata
/// envelope. Created once per file and discarded after storage hand-off.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub chunks: Vec<DocumentChunk>,
    pub metadata: Metadata,
}

impl ProcessedDocument {
    /// Decompose into the three parallel ordered sequences the storage
    /// contract expects: embeddings, per-chunk metadata, chunk texts.
    #[must_use]
    pub fn into_store_batch(self) -> (Vec<Vec<f32>>, Vec<Metadata>, Vec<String>) {
        let mut embeddings = Vec::with_capacity(self.chunks.len());
        let mut metadatas = Vec::with_capacity(self.chunks.len());
        let mut texts = Vec::with_capacity(self.chunks.len());
        for chunk in self.chunks {
            embeddings.push(chunk.embedding.unwrap_or_default());
            metadatas.push(chunk.metadata);
            texts.push(chunk.text);
        }
        (embeddings, metadatas, texts)
    }
}
