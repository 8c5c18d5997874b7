//! Text chunking with overlap and position tracking

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ChunkingConfig;
use crate::types::chunk::ChunkPosition;

/// Options controlling how a document is split
#[derive(Debug, Clone)]
pub struct ChunkOptions {
    /// Maximum chunk size in characters
    pub max_chunk_size: usize,
    /// Overlap between adjacent chunks in characters
    pub overlap: usize,
    /// Minimum chunk size; smaller chunks are silently dropped
    pub min_chunk_size: usize,
    /// Prefer sentence boundaries
    pub preserve_sentences: bool,
    /// Prefer paragraph boundaries
    pub preserve_paragraphs: bool,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            max_chunk_size: 1000,
            overlap: 100,
            min_chunk_size: 50,
            preserve_sentences: true,
            preserve_paragraphs: true,
        }
    }
}

impl From<&ChunkingConfig> for ChunkOptions {
    fn from(config: &ChunkingConfig) -> Self {
        Self {
            max_chunk_size: config.max_chunk_size,
            overlap: config.overlap,
            min_chunk_size: config.min_chunk_size,
            preserve_sentences: config.preserve_sentences,
            preserve_paragraphs: config.preserve_paragraphs,
        }
    }
}

/// One emitted chunk with its position in the normalized source text
#[derive(Debug, Clone)]
pub struct DocumentChunk {
    /// Chunk text
    pub text: String,
    /// Position metadata (offsets refer to the normalized text)
    pub position: ChunkPosition,
}

/// Splits raw text into overlapping, size-bounded chunks.
///
/// Chunks shorter than `min_chunk_size` are dropped rather than emitted;
/// ingestion accepts that small trailing fragments are lost.
#[derive(Debug, Default)]
pub struct DocumentChunker;

impl DocumentChunker {
    /// Create a new chunker
    pub fn new() -> Self {
        Self
    }

    /// Chunk a document into bounded, overlapping pieces
    pub fn chunk_document(&self, text: &str, options: &ChunkOptions) -> Vec<DocumentChunk> {
        let normalized = normalize_whitespace(text);

        tracing::debug!(
            input_len = text.len(),
            normalized_len = normalized.len(),
            max = options.max_chunk_size,
            "Chunking document"
        );

        if normalized.is_empty() {
            return Vec::new();
        }

        if normalized.len() <= options.max_chunk_size {
            if normalized.len() < options.min_chunk_size {
                return Vec::new();
            }
            return vec![DocumentChunk {
                position: ChunkPosition {
                    chunk_index: 0,
                    total_chunks: 1,
                    char_start: 0,
                    char_end: normalized.len(),
                },
                text: normalized,
            }];
        }

        let mut chunks = if options.preserve_paragraphs {
            let units = split_paragraphs(&normalized);
            self.accumulate(&normalized, units, "\n\n", options)
        } else if options.preserve_sentences {
            let units = split_sentences(&normalized);
            self.accumulate(&normalized, units, " ", options)
        } else {
            self.chunk_fixed(&normalized, 0, options)
        };

        let total = chunks.len() as u32;
        for chunk in &mut chunks {
            chunk.position.total_chunks = total;
        }

        chunks
    }

    /// Chunk markdown after stripping formatting syntax
    pub fn chunk_markdown(&self, markdown: &str, options: &ChunkOptions) -> Vec<DocumentChunk> {
        static CODE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());
        static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s+").unwrap());
        static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
        static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
        static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
        static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());

        let stripped = CODE_BLOCK.replace_all(markdown, "");
        let stripped = HEADING.replace_all(&stripped, "");
        let stripped = BOLD.replace_all(&stripped, "$1");
        let stripped = ITALIC.replace_all(&stripped, "$1");
        let stripped = INLINE_CODE.replace_all(&stripped, "$1");
        let stripped = LINK.replace_all(&stripped, "$1");

        self.chunk_document(&stripped, options)
    }

    /// Greedily accumulate units into bounded chunks, seeding each new chunk
    /// with an overlap tail of whole words from the previous one.
    fn accumulate(
        &self,
        normalized: &str,
        units: Vec<(usize, &str)>,
        separator: &str,
        options: &ChunkOptions,
    ) -> Vec<DocumentChunk> {
        let mut chunks: Vec<DocumentChunk> = Vec::new();
        let mut buffer = String::new();
        let mut buffer_start = 0usize;
        let mut buffer_end = 0usize;

        // A single unit longer than the budget cannot be kept whole; it is
        // pre-split into fixed windows.
        let mut expanded: Vec<(usize, String)> = Vec::new();
        for (offset, unit) in units {
            if unit.len() > options.max_chunk_size {
                for piece in self.chunk_fixed(unit, offset, options) {
                    expanded.push((piece.position.char_start, piece.text));
                }
            } else {
                expanded.push((offset, unit.to_string()));
            }
        }

        for (offset, unit) in expanded {
            if unit.is_empty() {
                continue;
            }

            let would_be = if buffer.is_empty() {
                unit.len()
            } else {
                buffer.len() + separator.len() + unit.len()
            };

            if !buffer.is_empty() && would_be > options.max_chunk_size {
                if buffer.len() >= options.min_chunk_size {
                    chunks.push(DocumentChunk {
                        text: buffer.trim().to_string(),
                        position: ChunkPosition {
                            chunk_index: chunks.len() as u32,
                            total_chunks: 0,
                            char_start: buffer_start,
                            char_end: buffer_end,
                        },
                    });
                }

                // Seed the next chunk with the overlap tail, unless doing so
                // would push the seeded buffer past the size bound.
                let tail = overlap_tail(&buffer, options.overlap);
                if !tail.is_empty()
                    && tail.len() + separator.len() + unit.len() <= options.max_chunk_size
                {
                    buffer_start = offset.saturating_sub(tail.len() + separator.len());
                    buffer = tail;
                    buffer.push_str(separator);
                    buffer.push_str(&unit);
                } else {
                    buffer_start = offset;
                    buffer = unit.clone();
                }
            } else {
                if buffer.is_empty() {
                    buffer_start = offset;
                } else {
                    buffer.push_str(separator);
                }
                buffer.push_str(&unit);
            }

            buffer_end = offset + unit.len();
        }

        if buffer.trim().len() >= options.min_chunk_size {
            chunks.push(DocumentChunk {
                text: buffer.trim().to_string(),
                position: ChunkPosition {
                    chunk_index: chunks.len() as u32,
                    total_chunks: 0,
                    char_start: buffer_start,
                    char_end: buffer_end,
                },
            });
        }

        chunks
    }

    /// Fixed-size fallback: slide a window of `max_chunk_size`, advancing by
    /// `max_chunk_size - overlap` each step.
    fn chunk_fixed(
        &self,
        text: &str,
        base_offset: usize,
        options: &ChunkOptions,
    ) -> Vec<DocumentChunk> {
        let mut chunks = Vec::new();
        let step = options.max_chunk_size.saturating_sub(options.overlap).max(1);
        let mut start = 0usize;

        while start < text.len() {
            let end = floor_char_boundary(text, (start + options.max_chunk_size).min(text.len()));
            let piece = &text[start..end];

            if piece.len() >= options.min_chunk_size {
                chunks.push(DocumentChunk {
                    text: piece.to_string(),
                    position: ChunkPosition {
                        chunk_index: chunks.len() as u32,
                        total_chunks: 0,
                        char_start: base_offset + start,
                        char_end: base_offset + end,
                    },
                });
            }

            if end == text.len() {
                break;
            }
            // Round the advance up to a char boundary. Rounding down could
            // land back on `start` when the step falls inside a multibyte
            // char, and the loop would never terminate.
            let mut next = start + step;
            while next < text.len() && !text.is_char_boundary(next) {
                next += 1;
            }
            start = next;
        }

        chunks
    }
}

/// Unify line endings, collapse blank-line runs to one blank line, and
/// collapse internal space/tab runs to single spaces.
fn normalize_whitespace(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(unified.len());
    let mut newlines = 0usize;
    let mut pending_space = false;

    for c in unified.chars() {
        match c {
            '\n' => {
                newlines += 1;
                pending_space = false;
            }
            ' ' | '\t' => {
                if newlines == 0 {
                    pending_space = true;
                }
            }
            _ => {
                if newlines > 0 {
                    if !out.is_empty() {
                        out.push_str(if newlines >= 2 { "\n\n" } else { "\n" });
                    }
                    newlines = 0;
                } else if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            }
        }
    }

    out
}

/// Split into paragraphs (blank-line separated), with byte offsets into the
/// normalized text
fn split_paragraphs(text: &str) -> Vec<(usize, &str)> {
    let mut units = Vec::new();
    let mut offset = 0usize;

    for part in text.split("\n\n") {
        let trimmed = part.trim();
        if !trimmed.is_empty() {
            let lead = part.len() - part.trim_start().len();
            units.push((offset + lead, trimmed));
        }
        offset += part.len() + 2;
    }

    units
}

/// Split into sentences at `.`/`!`/`?` followed by whitespace, with byte
/// offsets into the normalized text
fn split_sentences(text: &str) -> Vec<(usize, &str)> {
    let mut units = Vec::new();
    let mut start = 0usize;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let boundary = idx + c.len_utf8();
            let at_end = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if at_end {
                let sentence = text[start..boundary].trim();
                if !sentence.is_empty() {
                    let lead = text[start..boundary].len()
                        - text[start..boundary].trim_start().len();
                    units.push((start + lead, sentence));
                }
                start = boundary;
            }
        }
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        let lead = text[start..].len() - text[start..].trim_start().len();
        units.push((start + lead, rest));
    }

    units
}

/// Walk backward word-by-word from the end of `text` until the accumulated
/// tail would exceed the overlap budget
fn overlap_tail(text: &str, overlap: usize) -> String {
    if overlap == 0 {
        return String::new();
    }

    let mut words: Vec<&str> = Vec::new();
    let mut tail_len = 0usize;

    for word in text.split_whitespace().rev() {
        let added = if words.is_empty() {
            word.len()
        } else {
            word.len() + 1
        };
        if tail_len + added > overlap {
            break;
        }
        tail_len += added;
        words.push(word);
    }

    words.reverse();
    words.join(" ")
}

/// Largest byte index `<= index` that lands on a char boundary
fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(max: usize, overlap: usize, min: usize) -> ChunkOptions {
        ChunkOptions {
            max_chunk_size: max,
            overlap,
            min_chunk_size: min,
            preserve_sentences: true,
            preserve_paragraphs: true,
        }
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunker = DocumentChunker::new();
        let chunks = chunker.chunk_document(
            "A short paragraph that easily fits in one chunk.",
            &ChunkOptions::default(),
        );
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].position.chunk_index, 0);
        assert_eq!(chunks[0].position.total_chunks, 1);
    }

    #[test]
    fn text_below_min_size_is_dropped() {
        let chunker = DocumentChunker::new();
        let chunks = chunker.chunk_document("tiny", &ChunkOptions::default());
        assert!(chunks.is_empty());
    }

    #[test]
    fn no_chunk_exceeds_max_size() {
        let chunker = DocumentChunker::new();
        let sentence = "The quick brown fox jumps over the lazy dog and keeps running. ";
        let text = sentence.repeat(40);
        let opts = options(200, 40, 30);

        let chunks = chunker.chunk_document(&text, &opts);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(
                chunk.text.len() <= opts.max_chunk_size,
                "chunk of {} bytes exceeds max {}",
                chunk.text.len(),
                opts.max_chunk_size
            );
            assert!(chunk.text.len() >= opts.min_chunk_size);
        }
    }

    #[test]
    fn oversized_single_unit_is_hard_split() {
        let chunker = DocumentChunker::new();
        // One giant "sentence" with no terminators at all
        let text = "word ".repeat(500);
        let opts = options(200, 40, 30);

        let chunks = chunker.chunk_document(&text, &opts);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.len() <= opts.max_chunk_size);
        }
    }

    #[test]
    fn adjacent_chunks_share_overlap_words() {
        let chunker = DocumentChunker::new();
        let sentence = "Alpha bravo charlie delta echo foxtrot golf hotel india juliet. ";
        let text = sentence.repeat(20);
        // Sentence mode so the overlap-tail seeding path is what runs
        let mut opts = options(200, 50, 30);
        opts.preserve_paragraphs = false;

        let chunks = chunker.chunk_document(&text, &opts);
        assert!(chunks.len() > 1);

        for pair in chunks.windows(2) {
            let tail_words: Vec<&str> = pair[0].text.split_whitespace().rev().take(8).collect();
            let head_words: Vec<&str> = pair[1].text.split_whitespace().take(8).collect();
            let shared = head_words.iter().any(|w| tail_words.contains(w));
            assert!(shared, "no overlap between adjacent chunks");
        }
    }

    #[test]
    fn coverage_retains_all_words_when_nothing_is_dropped() {
        let chunker = DocumentChunker::new();
        let text = "Retrieval systems index documents as chunks. Each chunk is embedded \
                    into a vector space. Queries are embedded the same way. Similarity \
                    search finds the nearest chunks. The orchestrator renders them into \
                    a prompt. The model answers with citations attached to each claim.";
        let opts = options(120, 30, 20);

        let chunks = chunker.chunk_document(text, &opts);
        let joined: String = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        for word in normalize_whitespace(text).split_whitespace() {
            assert!(joined.contains(word), "word {:?} lost during chunking", word);
        }
    }

    #[test]
    fn total_chunks_is_backfilled() {
        let chunker = DocumentChunker::new();
        let text = "One sentence here. Another sentence there. ".repeat(30);
        let chunks = chunker.chunk_document(&text, &options(150, 30, 20));
        let total = chunks.len() as u32;
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.position.chunk_index, i as u32);
            assert_eq!(chunk.position.total_chunks, total);
        }
    }

    #[test]
    fn fixed_mode_advances_by_max_minus_overlap() {
        let chunker = DocumentChunker::new();
        let text = "x".repeat(1000);
        let opts = ChunkOptions {
            max_chunk_size: 300,
            overlap: 50,
            min_chunk_size: 10,
            preserve_sentences: false,
            preserve_paragraphs: false,
        };

        let chunks = chunker.chunk_document(&text, &opts);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            assert_eq!(
                pair[1].position.char_start - pair[0].position.char_start,
                250
            );
        }
    }

    #[test]
    fn normalization_collapses_whitespace() {
        let text = "First  line\t here.\r\n\r\n\r\n\r\nSecond   paragraph.";
        let normalized = normalize_whitespace(text);
        assert_eq!(normalized, "First line here.\n\nSecond paragraph.");
    }

    #[test]
    fn markdown_syntax_is_stripped() {
        let chunker = DocumentChunker::new();
        let markdown =
            "# Heading\n\nSome **bold** and *italic* text with a [link](https://example.com) \
             and `code` that should survive the formatting strip pass untouched.";
        let chunks = chunker.chunk_markdown(markdown, &ChunkOptions::default());
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.contains("bold"));
        assert!(chunks[0].text.contains("link"));
        assert!(!chunks[0].text.contains('#'));
        assert!(!chunks[0].text.contains("**"));
    }

    #[test]
    fn overlap_tail_respects_budget() {
        let tail = overlap_tail("one two three four five six seven", 10);
        assert!(tail.len() <= 10);
        assert!(tail.contains("seven"));
        assert_eq!(overlap_tail("anything", 0), "");
    }

    #[test]
    fn multibyte_text_never_panics() {
        let chunker = DocumentChunker::new();
        let text = "Ünïcödé wörds änd émojis 🦀🦀 ".repeat(100);
        let opts = ChunkOptions {
            max_chunk_size: 120,
            overlap: 30,
            min_chunk_size: 20,
            preserve_sentences: false,
            preserve_paragraphs: false,
        };
        let chunks = chunker.chunk_document(&text, &opts);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.text.len() <= opts.max_chunk_size);
        }
    }

    // Overlap one below the window size forces a one-byte step, which must
    // still make forward progress through 4-byte chars.
    #[test]
    fn near_total_overlap_terminates_on_multibyte_text() {
        let chunker = DocumentChunker::new();
        let text = "🦀".repeat(50);
        let opts = ChunkOptions {
            max_chunk_size: 8,
            overlap: 7,
            min_chunk_size: 1,
            preserve_sentences: false,
            preserve_paragraphs: false,
        };
        let chunks = chunker.chunk_document(&text, &opts);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.text.len() <= opts.max_chunk_size);
        }
        for pair in chunks.windows(2) {
            assert!(pair[1].position.char_start > pair[0].position.char_start);
        }
    }
}
