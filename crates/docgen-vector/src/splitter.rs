use docgen_core::{ChunkingConfig, DocGenError, Result, SourceDocument, TextChunk};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Splits text on a literal separator and greedily packs the pieces into
/// chunks of at most `chunk_size` characters, carrying up to `chunk_overlap`
/// characters of trailing pieces into the next chunk.
#[derive(Debug, Clone)]
pub struct CharacterTextSplitter {
    separator: String,
    chunk_size: usize,
    chunk_overlap: usize,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl CharacterTextSplitter {
    pub fn new(separator: impl Into<String>, chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_overlap > chunk_size {
            return Err(DocGenError::invalid_input(format!(
                "Got a larger chunk overlap ({}) than chunk size ({}), should be smaller.",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            separator: separator.into(),
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(&config.separator, config.chunk_size, config.chunk_overlap)
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        let pieces: Vec<&str> = if self.separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(self.separator.as_str())
                .filter(|piece| !piece.is_empty())
                .collect()
        };

        self.merge_pieces(&pieces)
    }

    /// Split every document, keeping its source and page on each chunk.
    pub fn split_documents(&self, documents: &[SourceDocument]) -> Vec<TextChunk> {
        let chunks: Vec<TextChunk> = documents
            .iter()
            .flat_map(|doc| {
                self.split_text(&doc.content)
                    .into_iter()
                    .enumerate()
                    .map(|(chunk_index, content)| {
                        TextChunk::new(content, doc.source.clone(), doc.page, chunk_index)
                    })
            })
            .collect();

        debug!(
            "Split {} documents into {} chunks",
            documents.len(),
            chunks.len()
        );
        chunks
    }

    fn join(&self, pieces: &VecDeque<&str>) -> Option<String> {
        let joined = pieces
            .iter()
            .copied()
            .collect::<Vec<_>>()
            .join(&self.separator);
        let trimmed = joined.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    fn merge_pieces(&self, pieces: &[&str]) -> Vec<String> {
        let separator_len = char_len(&self.separator);
        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joiner = |current: &VecDeque<&str>| {
                if current.is_empty() {
                    0
                } else {
                    separator_len
                }
            };

            if total + len + joiner(&current) > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total, self.chunk_size
                    );
                }

                if !current.is_empty() {
                    if let Some(chunk) = self.join(&current) {
                        chunks.push(chunk);
                    }

                    // Drop pieces from the front until what is left fits the overlap
                    // budget and leaves room for the incoming piece.
                    while total > self.chunk_overlap
                        || (total + len + joiner(&current) > self.chunk_size && total > 0)
                    {
                        let has_more = current.len() > 1;
                        let Some(front) = current.pop_front() else {
                            break;
                        };
                        total -= char_len(front) + if has_more { separator_len } else { 0 };
                    }
                }
            }

            current.push_back(piece);
            total += len + if current.len() > 1 { separator_len } else { 0 };
        }

        if let Some(chunk) = self.join(&current) {
            chunks.push(chunk);
        }

        chunks
    }
}
