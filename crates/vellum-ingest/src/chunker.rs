use serde_json::Value;

use crate::error::IngestError;
use crate::types::{DocumentChunk, Metadata};

#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters re-included from the previous chunk.
    pub chunk_overlap: usize,
    /// Preferred break string when no larger boundary fits.
    pub separator: String,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 32,
            separator: " ".to_owned(),
        }
    }
}

/// Granularity levels tried in order when a span exceeds the chunk budget.
#[derive(Debug, Clone, Copy)]
enum SplitLevel {
    Paragraph,
    Sentence,
    Word,
    Character,
}

impl SplitLevel {
    const fn next(self) -> Self {
        match self {
            Self::Paragraph => Self::Sentence,
            Self::Sentence => Self::Word,
            Self::Word | Self::Character => Self::Character,
        }
    }
}

/// Splits text into overlapping chunks, preferring natural boundaries:
/// paragraph breaks first, then sentence endings, then the configured
/// separator, then raw character cuts.
pub struct TextChunker {
    config: ChunkerConfig,
}

impl TextChunker {
    /// # Errors
    ///
    /// Rejects configurations where `chunk_overlap >= chunk_size`.
    pub fn new(config: ChunkerConfig) -> Result<Self, IngestError> {
        if config.chunk_overlap >= config.chunk_size {
            return Err(IngestError::ChunkConfiguration {
                size: config.chunk_size,
                overlap: config.chunk_overlap,
            });
        }
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Split `text` into chunks, pairing each with a copy of `base_metadata`
    /// extended with `chunk_text`, `chunk_index`, and `chunk_start`.
    ///
    /// `chunk_start` is a running offset advanced by
    /// `chunk_size - chunk_overlap` per emitted chunk: an accounting value,
    /// not a verified source-text offset, since natural-boundary cuts rarely
    /// land exactly on that stride.
    ///
    /// Empty input yields an empty sequence.
    #[must_use]
    pub fn chunk_text(&self, text: &str, base_metadata: &Metadata) -> Vec<DocumentChunk> {
        if text.is_empty() {
            return Vec::new();
        }

        tracing::debug!(
            chunk_size = self.config.chunk_size,
            chunk_overlap = self.config.chunk_overlap,
            "chunking text"
        );

        let mut pieces = Vec::new();
        self.collect_pieces(text, SplitLevel::Paragraph, &mut pieces);
        let merged = merge_pieces(&pieces, self.config.chunk_size, self.config.chunk_overlap);

        let stride = self.config.chunk_size - self.config.chunk_overlap;
        merged
            .into_iter()
            .enumerate()
            .map(|(index, content)| {
                let mut metadata = base_metadata.clone();
                metadata.insert("chunk_text".to_owned(), Value::from(content.clone()));
                metadata.insert("chunk_index".to_owned(), Value::from(index));
                metadata.insert("chunk_start".to_owned(), Value::from(index * stride));
                DocumentChunk::new(content, metadata)
            })
            .collect()
    }

    /// Recursively break `text` into pieces no longer than `chunk_size`,
    /// descending one granularity level whenever a span is still too long.
    fn collect_pieces(&self, text: &str, level: SplitLevel, out: &mut Vec<String>) {
        if text.chars().count() <= self.config.chunk_size {
            if !text.trim().is_empty() {
                out.push(text.to_owned());
            }
            return;
        }

        let parts: Vec<String> = match level {
            SplitLevel::Paragraph => text.split_inclusive("\n\n").map(str::to_owned).collect(),
            SplitLevel::Sentence => split_sentences(text),
            SplitLevel::Word if !self.config.separator.is_empty() => text
                .split_inclusive(self.config.separator.as_str())
                .map(str::to_owned)
                .collect(),
            SplitLevel::Word | SplitLevel::Character => {
                out.extend(split_chars(text, self.piece_width()));
                return;
            }
        };

        if parts.len() <= 1 {
            self.collect_pieces(text, level.next(), out);
            return;
        }
        for part in &parts {
            self.collect_pieces(part, level.next(), out);
        }
    }

    /// Width of raw character cuts. Overlap-sized atoms let the merge pass
    /// carry overlap even for text with no natural boundaries.
    fn piece_width(&self) -> usize {
        if self.config.chunk_overlap == 0 {
            self.config.chunk_size
        } else {
            self.config.chunk_overlap
        }
    }
}

/// Split after sentence endings followed by a space, keeping the terminator
/// with its sentence so concatenating the pieces reproduces the input.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    let chars: Vec<char> = text.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        current.push(c);

        if (c == '.' || c == '?' || c == '!')
            && i + 1 < chars.len()
            && chars[i + 1] == ' '
            && !current.trim().is_empty()
        {
            sentences.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        sentences.push(current);
    }

    sentences
}

fn split_chars(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|c| c.iter().collect())
        .collect()
}

/// Merge pieces into chunks, respecting size and overlap.
fn merge_pieces(pieces: &[String], chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let lens: Vec<usize> = pieces.iter().map(|p| p.chars().count()).collect();

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    // Sliding window: track only the piece indices contributing to the current chunk.
    let mut window_start = 0;

    for (idx, piece) in pieces.iter().enumerate() {
        if !current.is_empty() && current_len + lens[idx] > chunk_size {
            chunks.push(std::mem::take(&mut current));

            // Build overlap from recent pieces (walk backwards from current window),
            // leaving room for the incoming piece within the chunk budget.
            let mut overlap_len = 0;
            let mut overlap_start = idx;
            for i in (window_start..idx).rev() {
                if overlap_len + lens[i] > chunk_overlap
                    || overlap_len + lens[i] + lens[idx] > chunk_size
                {
                    break;
                }
                overlap_len += lens[i];
                overlap_start = i;
            }
            for p in &pieces[overlap_start..idx] {
                current.push_str(p);
            }
            current_len = overlap_len;
            window_start = overlap_start;
        }

        current.push_str(piece);
        current_len += lens[idx];
    }

    if !current.trim().is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(chunk_size: usize, chunk_overlap: usize) -> TextChunker {
        TextChunker::new(ChunkerConfig {
            chunk_size,
            chunk_overlap,
            separator: " ".to_owned(),
        })
        .unwrap()
    }

    fn base() -> Metadata {
        let mut meta = Metadata::new();
        meta.insert("filename".to_owned(), "test.txt".into());
        meta
    }

    #[test]
    fn overlap_must_be_smaller_than_size() {
        let result = TextChunker::new(ChunkerConfig {
            chunk_size: 32,
            chunk_overlap: 32,
            separator: " ".to_owned(),
        });
        assert!(matches!(
            result,
            Err(IngestError::ChunkConfiguration {
                size: 32,
                overlap: 32
            })
        ));
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunks = chunker(100, 10).chunk_text("", &base());
        assert!(chunks.is_empty());
    }

    #[test]
    fn short_text_single_chunk() {
        let chunks = chunker(100, 10).chunk_text("Hello world.", &base());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Hello world.");
    }

    #[test]
    fn chunks_never_exceed_size() {
        let text = "First sentence here. Second sentence here. Third sentence here. \
                    Fourth sentence here. Fifth sentence here.";
        let chunks = chunker(30, 5).chunk_text(text, &base());
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(
                chunk.text.chars().count() <= 30,
                "chunk too long: {:?}",
                chunk.text
            );
        }
    }

    #[test]
    fn prefers_sentence_boundaries() {
        let text = "Alpha beta gamma. Delta epsilon zeta.";
        let chunks = chunker(20, 5).chunk_text(text, &base());
        assert!(chunks.len() >= 2);
        // A sentence fits the budget, so the first cut lands on its ending.
        assert!(chunks[0].text.trim_end().ends_with('.'));
    }

    #[test]
    fn paragraph_break_preferred_over_sentence() {
        let text = "First paragraph here.\n\nSecond paragraph here.";
        let chunks = chunker(24, 0).chunk_text(text, &base());
        assert!(chunks[0].text.starts_with("First paragraph"));
        assert!(chunks[1].text.starts_with("Second paragraph"));
    }

    #[test]
    fn word_fallback_for_long_sentences() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = chunker(15, 0).chunk_text(text, &base());
        assert!(chunks.len() > 1);
        // Cuts land between words, never inside them.
        for chunk in &chunks {
            for word in chunk.text.split_whitespace() {
                assert!(text.contains(word), "word split mid-token: {word:?}");
            }
        }
    }

    #[test]
    fn character_fallback_for_unbroken_text() {
        let text = "a".repeat(100);
        let chunks = chunker(30, 0).chunk_text(&text, &base());
        assert!(chunks.len() > 1);
        let total: usize = chunks.iter().map(|c| c.text.chars().count()).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn consecutive_chunks_share_overlap() {
        let text = "aa. bb. cc. dd. ee. ff. gg. hh.";
        let chunks = chunker(10, 4).chunk_text(text, &base());
        assert!(chunks.len() > 1);
        // Second chunk starts with the tail of the first.
        let first = &chunks[0].text;
        let second = &chunks[1].text;
        assert!(
            first.ends_with(&second[..4.min(second.len())]),
            "no overlap between {first:?} and {second:?}"
        );
    }

    #[test]
    fn metadata_copied_and_extended() {
        let chunks = chunker(20, 5).chunk_text("Alpha beta gamma. Delta epsilon zeta.", &base());
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata["filename"], "test.txt");
            assert_eq!(chunk.metadata["chunk_text"], chunk.text.as_str());
            assert_eq!(chunk.metadata["chunk_index"], i);
            assert_eq!(chunk.metadata["chunk_start"], i * 15);
        }
    }

    #[test]
    fn indices_dense_from_zero() {
        let text = "word ".repeat(200);
        let chunks = chunker(50, 10).chunk_text(&text, &base());
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata["chunk_index"], i);
        }
    }

    #[test]
    fn chunking_is_deterministic() {
        let text = "Sentence one here. Sentence two here. Sentence three here.";
        let a: Vec<String> = chunker(25, 5)
            .chunk_text(text, &base())
            .into_iter()
            .map(|c| c.text)
            .collect();
        let b: Vec<String> = chunker(25, 5)
            .chunk_text(text, &base())
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn covers_all_words_of_input() {
        let text = "Alpha beta gamma. Delta epsilon zeta.";
        let chunks = chunker(20, 5).chunk_text(text, &base());
        let joined: String = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join("");
        for word in text.split_whitespace() {
            assert!(joined.contains(word.trim_end_matches('.')), "missing {word:?}");
        }
    }

    mod proptest_chunker {
        use super::*;
        use proptest::prelude::*;

        fn size_and_overlap() -> impl Strategy<Value = (usize, usize)> {
            (2usize..300).prop_flat_map(|size| (Just(size), 0..size))
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(500))]

            #[test]
            fn chunking_never_panics(
                content in "\\PC{0,2000}",
                (chunk_size, chunk_overlap) in size_and_overlap(),
            ) {
                let chunker = TextChunker::new(ChunkerConfig {
                    chunk_size,
                    chunk_overlap,
                    separator: " ".to_owned(),
                }).unwrap();
                let _ = chunker.chunk_text(&content, &Metadata::new());
            }

            #[test]
            fn chunks_stay_within_budget(
                content in "[a-z. !?\n ]{1,1000}",
                (chunk_size, chunk_overlap) in size_and_overlap(),
            ) {
                let chunker = TextChunker::new(ChunkerConfig {
                    chunk_size,
                    chunk_overlap,
                    separator: " ".to_owned(),
                }).unwrap();
                let chunks = chunker.chunk_text(&content, &Metadata::new());
                for chunk in &chunks {
                    prop_assert!(chunk.text.chars().count() <= chunk_size);
                }
            }

            #[test]
            fn indices_sequential_and_stride_accounted(
                content in "[a-z. ]{10,800}",
                (chunk_size, chunk_overlap) in size_and_overlap(),
            ) {
                let chunker = TextChunker::new(ChunkerConfig {
                    chunk_size,
                    chunk_overlap,
                    separator: " ".to_owned(),
                }).unwrap();
                let chunks = chunker.chunk_text(&content, &Metadata::new());
                let stride = chunk_size - chunk_overlap;
                for (i, chunk) in chunks.iter().enumerate() {
                    prop_assert_eq!(&chunk.metadata["chunk_index"], &serde_json::Value::from(i));
                    let start = &chunk.metadata["chunk_start"];
                    prop_assert_eq!(start, &serde_json::Value::from(i * stride));
                }
            }

            #[test]
            fn nonempty_content_yields_chunks(
                content in "[a-z]{1,500}( [a-z]{1,20}){0,50}",
                (chunk_size, chunk_overlap) in size_and_overlap(),
            ) {
                let chunker = TextChunker::new(ChunkerConfig {
                    chunk_size,
                    chunk_overlap,
                    separator: " ".to_owned(),
                }).unwrap();
                let chunks = chunker.chunk_text(&content, &Metadata::new());
                prop_assert!(!chunks.is_empty());
            }

            #[test]
            fn no_overlap_covers_all_content(
                content in "[a-z ]{10,500}",
                chunk_size in 10usize..200,
            ) {
                let chunker = TextChunker::new(ChunkerConfig {
                    chunk_size,
                    chunk_overlap: 0,
                    separator: " ".to_owned(),
                }).unwrap();
                let chunks = chunker.chunk_text(&content, &Metadata::new());
                // Whitespace-only pieces are dropped, so compare against the
                // non-whitespace content.
                let total: usize = chunks.iter().map(|c| c.text.chars().count()).sum();
                let meaningful = content.chars().filter(|c| !c.is_whitespace()).count();
                prop_assert!(total >= meaningful);
            }
        }
    }
}
