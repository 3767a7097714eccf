use std::path::Path;

use super::{BoxFuture, DocumentProcessor, checked_path};
use crate::DEFAULT_MAX_FILE_SIZE;
use crate::error::IngestError;
use crate::types::DocumentType;

pub struct TxtProcessor {
    pub max_file_size: u64,
}

impl Default for TxtProcessor {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentProcessor for TxtProcessor {
    fn can_process(&self, extension: &str) -> bool {
        extension == DocumentType::Txt.as_str()
    }

    fn extract_text(&self, path: &Path) -> BoxFuture<'_, Result<String, IngestError>> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let path = checked_path(&path, max_size).await?;
            let content = tokio::fs::read_to_string(&path).await?;
            Ok(content.trim_end().to_owned())
        })
    }
}
