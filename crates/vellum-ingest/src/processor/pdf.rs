use std::path::Path;

use super::{BoxFuture, DocumentProcessor, checked_path};
use crate::DEFAULT_MAX_FILE_SIZE;
use crate::error::IngestError;
use crate::types::DocumentType;

pub struct PdfProcessor {
    pub max_file_size: u64,
}

impl Default for PdfProcessor {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentProcessor for PdfProcessor {
    fn can_process(&self, extension: &str) -> bool {
        extension == DocumentType::Pdf.as_str()
    }

    fn extract_text(&self, path: &Path) -> BoxFuture<'_, Result<String, IngestError>> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let path = checked_path(&path, max_size).await?;

            let pages = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_by_pages(&path)
                    .map_err(|e| IngestError::Extraction(e.to_string()))
            })
            .await
            .map_err(|e| IngestError::Io(std::io::Error::other(e)))??;

            Ok(join_pages(&pages))
        })
    }
}

/// Concatenate per-page text joined by newline, trimming trailing whitespace.
fn join_pages(pages: &[String]) -> String {
    pages.join("\n").trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_only_pdf() {
        let processor = PdfProcessor::default();
        assert!(processor.can_process("pdf"));
        assert!(!processor.can_process("txt"));
    }

    #[test]
    fn pages_joined_by_newline_and_trimmed() {
        let pages = vec!["page one text".to_owned(), "page two text \n".to_owned()];
        assert_eq!(join_pages(&pages), "page one text\npage two text");
    }

    #[test]
    fn single_page_unchanged() {
        let pages = vec!["only page".to_owned()];
        assert_eq!(join_pages(&pages), "only page");
    }

    #[test]
    fn no_pages_is_empty() {
        assert!(join_pages(&[]).is_empty());
    }

    #[tokio::test]
    async fn corrupt_pdf_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.pdf");
        std::fs::write(&file, "not a real pdf").unwrap();

        let result = PdfProcessor::default().extract_text(&file).await;
        assert!(matches!(result, Err(IngestError::Extraction(_))));
    }
}
