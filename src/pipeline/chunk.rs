//! Chunker: split page text into bounded, overlapping token windows.
//!
//! Pages are concatenated in document order and encoded once. Windows of
//! `chunk_size` tokens are then taken greedily; after each window the cursor
//! steps back `overlap` tokens, so every chunk after the first opens with the
//! tail of its predecessor. The duplicated tokens keep sentences that straddle
//! a boundary readable for the summariser.
//!
//! ```text
//! tokens   0 ─────────────── 1000
//!                        900 ─────────────── 1900
//!                                        1800 ──────── 2350 (end)
//! ```

use crate::error::ChunkError;
use crate::pipeline::pages::Page;
use crate::pipeline::tokenizer::Tokenizer;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// Separator inserted between the texts of adjacent non-empty pages.
pub const PAGE_JOINER: &str = "\n";

/// How far a window edge may move to avoid splitting a UTF-8 character.
const MAX_BOUNDARY_SHIFT: usize = 16;

/// Smallest accepted window. A byte-level token covers at least one byte,
/// so eight tokens always hold one whole character (at most four bytes)
/// after skipping the tail of a character cut by the previous window.
pub const MIN_CHUNK_SIZE: usize = 8;

/// A bounded-length piece of document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TextChunk(String);

impl TextChunk {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for TextChunk {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TextChunk {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for TextChunk {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TextChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Chunks in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChunkSequence(Vec<TextChunk>);

impl ChunkSequence {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TextChunk> {
        self.0.iter()
    }

    pub fn get(&self, i: usize) -> Option<&TextChunk> {
        self.0.get(i)
    }

    /// All chunk texts joined with `sep`.
    pub fn join(&self, sep: &str) -> String {
        self.0
            .iter()
            .map(TextChunk::as_str)
            .collect::<Vec<_>>()
            .join(sep)
    }
}

impl<'a> IntoIterator for &'a ChunkSequence {
    type Item = &'a TextChunk;
    type IntoIter = std::slice::Iter<'a, TextChunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T: Into<TextChunk>> FromIterator<T> for ChunkSequence {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Reported when the document had more pages than the limit allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Truncation {
    /// Pages that were kept (the first `kept`).
    pub kept: usize,
    /// Pages the document actually has.
    pub total: usize,
}

/// Result of a successful [`chunk`] call.
#[derive(Debug, Clone)]
pub struct Chunked {
    pub chunks: ChunkSequence,
    /// `Some` when pages beyond the limit were dropped.
    pub truncation: Option<Truncation>,
    /// Pages that contributed (after truncation, including blank ones).
    pub pages_used: usize,
    /// Tokens in the concatenated text, before overlap duplication.
    pub total_tokens: usize,
}

/// Split `pages` into overlapping chunks of at most `chunk_size` tokens.
///
/// Only the first `max_pages` pages are used; dropping the rest is reported
/// through [`Chunked::truncation`], not as an error. Pages with empty text
/// contribute nothing. Text no longer than `chunk_size` tokens comes back as
/// a single chunk, unchanged.
///
/// # Errors
/// - [`ChunkError::EmptyInput`] when `pages` is empty or holds no text
/// - [`ChunkError::InvalidChunkSize`] when `chunk_size < MIN_CHUNK_SIZE`,
///   `overlap >= chunk_size` or `max_pages == 0`
/// - [`ChunkError::Tokenization`] when a window cannot be decoded
pub fn chunk(
    pages: &[Page],
    max_pages: usize,
    chunk_size: usize,
    overlap: usize,
    tokenizer: &dyn Tokenizer,
) -> Result<Chunked, ChunkError> {
    if chunk_size < MIN_CHUNK_SIZE {
        return Err(ChunkError::InvalidChunkSize(format!(
            "chunk size {chunk_size} is below the minimum of {MIN_CHUNK_SIZE} tokens"
        )));
    }
    if overlap >= chunk_size {
        return Err(ChunkError::InvalidChunkSize(format!(
            "overlap {overlap} must be smaller than chunk size {chunk_size}"
        )));
    }
    if max_pages == 0 {
        return Err(ChunkError::InvalidChunkSize(
            "page limit must be at least 1".into(),
        ));
    }
    if pages.is_empty() {
        return Err(ChunkError::EmptyInput);
    }

    let truncation = if pages.len() > max_pages {
        warn!(
            "Document has {} pages; only the first {} are used",
            pages.len(),
            max_pages
        );
        Some(Truncation {
            kept: max_pages,
            total: pages.len(),
        })
    } else {
        None
    };
    let used = &pages[..pages.len().min(max_pages)];

    let text = used
        .iter()
        .map(Page::text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(PAGE_JOINER);
    if text.trim().is_empty() {
        return Err(ChunkError::EmptyInput);
    }

    let tokens = tokenizer.encode(&text);
    let chunks = if tokens.len() <= chunk_size {
        vec![TextChunk(text)]
    } else {
        split_tokens(&tokens, chunk_size, overlap, tokenizer)?
    };

    debug!(
        "{} tokens from {} pages → {} chunks (size {}, overlap {})",
        tokens.len(),
        used.len(),
        chunks.len(),
        chunk_size,
        overlap
    );

    Ok(Chunked {
        chunks: ChunkSequence(chunks),
        truncation,
        pages_used: used.len(),
        total_tokens: tokens.len(),
    })
}

/// Greedy windowing over an already-encoded token sequence.
fn split_tokens(
    tokens: &[u32],
    chunk_size: usize,
    overlap: usize,
    tokenizer: &dyn Tokenizer,
) -> Result<Vec<TextChunk>, ChunkError> {
    let mut chunks = Vec::with_capacity(tokens.len() / (chunk_size - overlap) + 1);
    let mut cursor = 0;

    while cursor < tokens.len() {
        let end = (cursor + chunk_size).min(tokens.len());
        let (start, end, text) = decode_window(tokens, cursor, end, tokenizer)?;
        chunks.push(TextChunk(text));

        if end == tokens.len() {
            break;
        }
        cursor = end.saturating_sub(overlap).max(start + 1);
    }

    Ok(chunks)
}

/// Decode `tokens[start..end]`, nudging the edges inward when a byte-level
/// token boundary falls inside a multi-byte character.
fn decode_window(
    tokens: &[u32],
    start: usize,
    end: usize,
    tokenizer: &dyn Tokenizer,
) -> Result<(usize, usize, String), ChunkError> {
    for back in 0..=MAX_BOUNDARY_SHIFT.min(end - start - 1) {
        let e = end - back;
        for fwd in 0..=MAX_BOUNDARY_SHIFT {
            let s = start + fwd;
            if s >= e {
                break;
            }
            if let Some(text) = tokenizer.decode(&tokens[s..e]) {
                if back > 0 || fwd > 0 {
                    debug!("Window {start}..{end} shifted to {s}..{e} on a character boundary");
                }
                return Ok((s, e, text));
            }
        }
    }

    Err(ChunkError::Tokenization(format!(
        "tokens {start}..{end} do not decode to valid UTF-8"
    )))
}
