use std::io::Read;
use std::path::Path;

use super::{BoxFuture, DocumentProcessor, checked_path};
use crate::DEFAULT_MAX_FILE_SIZE;
use crate::error::IngestError;
use crate::types::DocumentType;

pub struct DocxProcessor {
    pub max_file_size: u64,
}

impl Default for DocxProcessor {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentProcessor for DocxProcessor {
    fn can_process(&self, extension: &str) -> bool {
        extension == DocumentType::Docx.as_str()
    }

    fn extract_text(&self, path: &Path) -> BoxFuture<'_, Result<String, IngestError>> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let path = checked_path(&path, max_size).await?;

            tokio::task::spawn_blocking(move || read_docx_text(&path))
                .await
                .map_err(|e| IngestError::Io(std::io::Error::other(e)))?
        })
    }
}

/// Pull `word/document.xml` out of the archive and join paragraph texts with
/// newlines, in document order.
fn read_docx_text(path: &Path) -> Result<String, IngestError> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| IngestError::Extraction(format!("invalid DOCX archive: {e}")))?;

    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|_| IngestError::Extraction("no document.xml in DOCX archive".to_owned()))?;

    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;

    Ok(paragraphs_from_xml(&xml))
}

/// Minimal WordprocessingML walk: collect `w:t` run text, close a paragraph
/// on `/w:p`. Not a general XML parser.
fn paragraphs_from_xml(xml: &str) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    let mut chars = xml.chars();
    while let Some(c) = chars.next() {
        if c == '<' {
            let mut tag = String::new();
            for tc in chars.by_ref() {
                if tc == '>' {
                    break;
                }
                tag.push(tc);
            }

            if tag == "/w:t" {
                in_text = false;
            } else if (tag == "w:t" || tag.starts_with("w:t ")) && !tag.ends_with('/') {
                in_text = true;
            } else if tag == "/w:p" {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else if in_text {
            current.push(c);
        }
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }

    unescape_entities(&paragraphs.join("\n"))
}

fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
