// file: src/splitter/mod.rs
// description: recursive character text splitting with overlap
// reference: splits on paragraph, line, and word boundaries before hard cuts

use tracing::debug;

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Splits text into chunks of bounded size, preferring natural boundaries.
///
/// Separators are tried in order: paragraph breaks, line breaks, spaces,
/// then hard character cuts. Consecutive chunks share up to `chunk_overlap`
/// characters of trailing context.
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

/// Statistics over a set of produced chunks.
#[derive(Debug, Clone, Default)]
pub struct ChunkStats {
    pub total_chunks: usize,
    pub total_characters: usize,
    pub avg_chunk_size: usize,
    pub min_chunk_size: usize,
    pub max_chunk_size: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        debug!(
            "Text splitter initialized with chunk_size={}, overlap={}",
            chunk_size, chunk_overlap
        );
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let chunks = self.split_with(trimmed, &DEFAULT_SEPARATORS);
        chunks
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }

    pub fn stats(&self, chunks: &[String]) -> ChunkStats {
        if chunks.is_empty() {
            return ChunkStats::default();
        }

        let sizes: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();
        let total_characters: usize = sizes.iter().sum();

        ChunkStats {
            total_chunks: chunks.len(),
            total_characters,
            avg_chunk_size: total_characters / chunks.len(),
            min_chunk_size: *sizes.iter().min().unwrap_or(&0),
            max_chunk_size: *sizes.iter().max().unwrap_or(&0),
        }
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        if text.chars().count() <= self.chunk_size {
            return vec![text.to_string()];
        }

        // Pick the first separator present in the text; the empty separator
        // always matches and forces a hard cut.
        let (sep_index, separator) = separators
            .iter()
            .enumerate()
            .find(|(_, sep)| sep.is_empty() || text.contains(**sep))
            .map(|(i, sep)| (i, *sep))
            .unwrap_or((separators.len() - 1, ""));

        if separator.is_empty() {
            return self.hard_split(text);
        }

        let remaining = &separators[sep_index + 1..];
        let mut pieces = Vec::new();

        for part in text.split(separator) {
            if part.is_empty() {
                continue;
            }
            if part.chars().count() <= self.chunk_size {
                pieces.push(part.to_string());
            } else {
                pieces.extend(self.split_with(part, remaining));
            }
        }

        self.merge(pieces, separator)
    }

    /// Greedily join pieces into chunks up to `chunk_size`, carrying trailing
    /// pieces totalling at most `chunk_overlap` into the next chunk.
    fn merge(&self, pieces: Vec<String>, separator: &str) -> Vec<String> {
        let sep_len = separator.chars().count();
        let mut chunks = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut current_len = 0usize;

        for piece in pieces {
            let piece_len = piece.chars().count();
            let joined_len = current_len + piece_len + if current.is_empty() { 0 } else { sep_len };

            if joined_len > self.chunk_size && !current.is_empty() {
                chunks.push(current.join(separator));

                // Retain overlap context from the tail of the flushed chunk,
                // dropping further if the next piece would not fit beside it
                while !current.is_empty()
                    && (current_len > self.chunk_overlap
                        || current_len + piece_len + sep_len > self.chunk_size)
                {
                    let dropped = current.remove(0);
                    current_len -= dropped.chars().count();
                    if !current.is_empty() {
                        current_len -= sep_len;
                    }
                }
            }

            if !current.is_empty() {
                current_len += sep_len;
            }
            current_len += piece_len;
            current.push(piece);
        }

        if !current.is_empty() {
            chunks.push(current.join(separator));
        }

        chunks
    }

    fn hard_split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let step = (self.chunk_size - self.chunk_overlap).max(1);
        let mut chunks = Vec::new();

        let mut start = 0;
        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}
