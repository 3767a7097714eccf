use std::path::Path;

use pulldown_cmark::{Parser, html};

use super::{BoxFuture, DocumentProcessor, checked_path};
use crate::DEFAULT_MAX_FILE_SIZE;
use crate::error::IngestError;
use crate::types::DocumentType;

pub struct MarkdownProcessor {
    pub max_file_size: u64,
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentProcessor for MarkdownProcessor {
    fn can_process(&self, extension: &str) -> bool {
        extension == DocumentType::Md.as_str()
    }

    fn extract_text(&self, path: &Path) -> BoxFuture<'_, Result<String, IngestError>> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let path = checked_path(&path, max_size).await?;
            let content = tokio::fs::read_to_string(&path).await?;
            Ok(markdown_to_plain(&content))
        })
    }
}

/// Render Markdown to HTML, turn paragraph tags into newlines, then collapse
/// remaining markup and whitespace into single-spaced text. Best-effort: not
/// a full HTML-tag stripper.
fn markdown_to_plain(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut rendered = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut rendered, parser);

    let text = rendered.replace("<p>", "\n").replace("</p>", "\n");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
