use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A static reference text, one per financial topic, loaded once at process
/// start from a bundled file and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    /// Stable identifier derived from the source file stem, e.g. "debt_management".
    pub topic: String,
    pub content: String,
    pub loaded_at: DateTime<Utc>,
}

impl Document {
    pub fn new(topic: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.into(),
            content: content.into(),
            loaded_at: Utc::now(),
        }
    }
}

/// A contiguous span of a [`Document`], the unit of retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: Uuid,
    pub document_id: Uuid,
    pub topic: String,
    pub content: String,
    pub chunk_index: usize,
    /// Byte offset range of this chunk within the source document content.
    pub span: ChunkSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSpan {
    pub start: usize,
    pub end: usize,
}

impl DocumentChunk {
    pub fn new(
        document: &Document,
        content: impl Into<String>,
        chunk_index: usize,
        span: ChunkSpan,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id: document.id,
            topic: document.topic.clone(),
            content: content.into(),
            chunk_index,
            span,
        }
    }
}

/// One retrieval hit: a chunk paired with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// Splits a document into chunks on paragraph boundaries.
///
/// Paragraphs are accumulated until adding the next one would exceed
/// `chunk_size` bytes, then a new chunk starts. A single paragraph larger
/// than `chunk_size` becomes its own chunk rather than being split
/// mid-sentence. Spans index into the original `document.content`.
pub fn chunk_document(document: &Document, chunk_size: usize) -> Vec<DocumentChunk> {
    let content = document.content.as_str();
    let mut chunks = Vec::new();
    let mut chunk_index = 0;

    // (start, end) byte range of the paragraph run being accumulated.
    let mut current: Option<ChunkSpan> = None;

    let mut offset = 0;
    for piece in split_paragraphs(content) {
        let para_start = offset + leading_ws(&content[offset..piece.0]);
        let para_end = piece.1;
        offset = piece.1;

        if content[para_start..para_end].trim().is_empty() {
            continue;
        }

        match current {
            Some(span) if para_end - span.start > chunk_size => {
                chunks.push(make_chunk(document, span, chunk_index));
                chunk_index += 1;
                current = Some(ChunkSpan {
                    start: para_start,
                    end: para_end,
                });
            }
            Some(span) => {
                current = Some(ChunkSpan {
                    start: span.start,
                    end: para_end,
                });
            }
            None => {
                current = Some(ChunkSpan {
                    start: para_start,
                    end: para_end,
                });
            }
        }
    }

    if let Some(span) = current {
        chunks.push(make_chunk(document, span, chunk_index));
    }

    chunks
}

fn make_chunk(document: &Document, span: ChunkSpan, index: usize) -> DocumentChunk {
    let text = document.content[span.start..span.end].trim();
    DocumentChunk::new(document, text, index, span)
}

/// Yields (start, end) byte ranges covering the content, one per paragraph,
/// where `end` points past the paragraph text (exclusive of the separator).
fn split_paragraphs(content: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = 0;

    for (idx, _) in content.match_indices("\n\n") {
        if idx > start {
            ranges.push((start, idx));
        }
        start = idx + 2;
    }
    if start < content.len() {
        ranges.push((start, content.len()));
    }

    ranges
}

fn leading_ws(s: &str) -> usize {
    s.len() - s.trim_start().len()
}
