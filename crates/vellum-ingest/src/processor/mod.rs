mod docx;
mod markdown;
mod pdf;
mod text;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

pub use docx::DocxProcessor;
pub use markdown::MarkdownProcessor;
pub use pdf::PdfProcessor;
pub use text::TxtProcessor;

use crate::error::IngestError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Format-specific text extraction. Implementations are stateless and safe
/// to share read-only across concurrently scheduled tasks.
pub trait DocumentProcessor: Send + Sync {
    /// Whether this variant handles the given (lowercase) extension.
    fn can_process(&self, extension: &str) -> bool;

    /// Extract plain text from the file at `path`.
    fn extract_text(&self, path: &Path) -> BoxFuture<'_, Result<String, IngestError>>;
}

/// Dispatches a file extension to the matching processor variant.
///
/// The registry is fixed at construction and immutable afterwards.
pub struct ProcessorFactory {
    processors: Vec<Box<dyn DocumentProcessor>>,
}

impl ProcessorFactory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            processors: vec![
                Box::new(PdfProcessor::default()),
                Box::new(TxtProcessor::default()),
                Box::new(DocxProcessor::default()),
                Box::new(MarkdownProcessor::default()),
            ],
        }
    }

    /// Resolve a processor for the extension, trying registered variants in
    /// declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::UnsupportedFileType`] when no variant matches.
    pub fn resolve(&self, extension: &str) -> Result<&dyn DocumentProcessor, IngestError> {
        let extension = extension.to_ascii_lowercase();
        tracing::debug!(extension = %extension, "resolving document processor");
        self.processors
            .iter()
            .find(|p| p.can_process(&extension))
            .map(AsRef::as_ref)
            .ok_or(IngestError::UnsupportedFileType(extension))
    }
}

impl Default for ProcessorFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonicalize the path and enforce the size limit before extraction.
pub(crate) async fn checked_path(path: &Path, max_size: u64) -> Result<PathBuf, IngestError> {
    let path = std::fs::canonicalize(path)?;

    let meta = tokio::fs::metadata(&path).await?;
    if meta.len() > max_size {
        return Err(IngestError::FileTooLarge(meta.len()));
    }

    Ok(path)
}
