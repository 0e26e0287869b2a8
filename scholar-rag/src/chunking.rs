//! Document chunking.
//!
//! [`RecursiveChunker`] tries a prioritized list of separators (paragraph
//! break, line break, sentence punctuation, space) and falls back to a hard
//! character cut, so chunks follow the text's structure where possible and
//! never exceed `chunk_size` characters. Each chunk repeats the last
//! `chunk_overlap` characters of the previous one.

use tracing::debug;

use crate::config::RagConfig;
use crate::document::{CHUNK_OVERLAP_KEY, CHUNK_SIZE_KEY, Chunk, Metadata, SourceText};

/// Separators tried in order. The empty separator means "cut anywhere".
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "! ", "? ", " ", ""];

/// A strategy for splitting text into chunks.
pub trait Chunker: Send + Sync {
    /// Split `text` into ordered chunks, each carrying `metadata` plus the
    /// chunking parameters used.
    ///
    /// Returns an empty `Vec` for empty or whitespace-only text.
    fn split(&self, text: &str, metadata: &Metadata) -> Vec<Chunk>;

    /// Split a loaded [`SourceText`].
    fn chunk(&self, source: &SourceText) -> Vec<Chunk> {
        self.split(&source.text, &source.metadata)
    }
}

/// Cuts text at the furthest separator that fits in `chunk_size`
/// characters, trying separators in priority order, and opens each chunk
/// with the last `chunk_overlap` characters of the one before it.
///
/// Lengths are measured in `char`s. Separators stay attached to the end of
/// the chunk they terminate, and every chunk is trimmed of surrounding
/// whitespace.
///
/// # Example
///
/// ```rust,ignore
/// use scholar_rag::{Chunker, RecursiveChunker};
///
/// let chunker = RecursiveChunker::new(1000, 200);
/// let chunks = chunker.chunk(&source);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker` with [`DEFAULT_SEPARATORS`].
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per chunk
    /// * `chunk_overlap`: number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Create a chunker from a validated [`RagConfig`].
    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Replace the separator priority list.
    ///
    /// A hard character cut is still used when no separator matches.
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    /// The configured maximum chunk size.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The configured overlap.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split text into chunk strings without attaching metadata.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let separators: Vec<Vec<char>> = self.separators.iter().map(|s| s.chars().collect()).collect();
        let text_end = trimmed_end(&chars, chars.len());

        let mut chunks = Vec::new();
        let Some(mut start) = skip_whitespace(&chars, 0, text_end) else {
            return chunks;
        };
        // End of the previous chunk. Every chunk must reach past it.
        let mut floor = start;

        loop {
            if start + self.chunk_size >= text_end {
                chunks.push(chars[start..text_end].iter().collect());
                break;
            }

            let cut = self.find_break(&chars, &separators, start, floor);
            let end = trimmed_end(&chars, cut);
            if end <= floor {
                // Nothing but whitespace beyond the previous chunk.
                start = skip_whitespace(&chars, cut, text_end).unwrap_or(text_end);
                floor = start;
                continue;
            }

            chunks.push(chars[start..end].iter().collect());
            start = self.next_start(&chars, start, end, text_end);
            floor = end;
        }

        chunks
    }

    /// Find where the chunk starting at `start` ends.
    ///
    /// Takes the furthest break within `chunk_size` for the first separator
    /// that yields one. A break only counts if it extends past `floor` and
    /// leaves room for the next chunk to open with the full overlap.
    fn find_break(&self, chars: &[char], separators: &[Vec<char>], start: usize, floor: usize) -> usize {
        let limit = start + self.chunk_size;

        for separator in separators {
            if separator.is_empty() {
                break;
            }
            let mut pos = limit;
            while pos > floor && pos >= start + separator.len() {
                if chars[pos - separator.len()..pos] == separator[..] && self.accepts(chars, start, floor, pos) {
                    return pos;
                }
                pos -= 1;
            }
        }

        debug!(start, chunk_size = self.chunk_size, "no separator fits, cutting by character");
        limit
    }

    fn accepts(&self, chars: &[char], start: usize, floor: usize, cut: usize) -> bool {
        let end = trimmed_end(chars, cut);
        end > floor && (self.chunk_overlap == 0 || self.overlap_start(chars, start, end).is_some())
    }

    /// Start of the chunk after `chars[start..end]`.
    fn next_start(&self, chars: &[char], start: usize, end: usize, text_end: usize) -> usize {
        if self.chunk_overlap > 0 {
            if let Some(next) = self.overlap_start(chars, start, end) {
                return next;
            }
        }
        skip_whitespace(chars, end, text_end).unwrap_or(text_end)
    }

    /// Where the next chunk opens so it repeats the last `chunk_overlap`
    /// characters of `chars[start..end]`.
    ///
    /// Moves back over whitespace so a chunk never opens on it, as long as
    /// the shared span stays shorter than `chunk_size`. `None` when the chunk
    /// is too short to leave anything new behind the overlap.
    fn overlap_start(&self, chars: &[char], start: usize, end: usize) -> Option<usize> {
        let keep = self.chunk_overlap.min(end - start);
        let mut next = end - keep;
        while next > start && next < end && chars[next].is_whitespace() && end - next < self.chunk_size - 1 {
            next -= 1;
        }
        (next > start && next < end && !chars[next].is_whitespace()).then_some(next)
    }
}

impl Chunker for RecursiveChunker {
    fn split(&self, text: &str, metadata: &Metadata) -> Vec<Chunk> {
        self.split_text(text)
            .into_iter()
            .map(|content| {
                let mut metadata = metadata.clone();
                metadata.insert(CHUNK_SIZE_KEY.to_string(), self.chunk_size.to_string());
                metadata.insert(CHUNK_OVERLAP_KEY.to_string(), self.chunk_overlap.to_string());
                Chunk { content, metadata }
            })
            .collect()
    }
}

/// Index of the first non-whitespace char in `chars[from..to]`.
fn skip_whitespace(chars: &[char], from: usize, to: usize) -> Option<usize> {
    (from..to).find(|&i| !chars[i].is_whitespace())
}

/// `end` moved back over trailing whitespace.
fn trimmed_end(chars: &[char], end: usize) -> usize {
    let mut end = end;
    while end > 0 && chars[end - 1].is_whitespace() {
        end -= 1;
    }
    end
}
