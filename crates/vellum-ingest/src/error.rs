#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("file too large: {0} bytes")]
    FileTooLarge(u64),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("chunk overlap {overlap} must be smaller than chunk size {size}")]
    ChunkConfiguration { size: usize, overlap: usize },

    #[error("embedding failed: {0}")]
    Embedding(#[from] vellum_embed::EmbedError),
}
