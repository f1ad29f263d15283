// file: src/models/search_result.rs
// description: Search result model with similarity scores
// reference: Used for vector similarity search results

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Chunk ID
    pub id: String,

    /// Source file name
    pub source_file: String,

    /// Index of the chunk within its source document
    pub chunk_index: usize,

    /// Chunk content
    pub content: String,

    /// Similarity score (higher is more similar, in (0.0, 1.0])
    pub score: f32,

    /// Optional: Distance metric (lower is more similar)
    pub distance: Option<f32>,

    /// Chunk size in characters
    pub char_count: usize,

    /// Ingestion timestamp
    pub ingested_at: u64,
}

impl SearchResult {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        source_file: String,
        chunk_index: usize,
        content: String,
        score: f32,
        distance: Option<f32>,
        char_count: usize,
        ingested_at: u64,
    ) -> Self {
        Self {
            id,
            source_file,
            chunk_index,
            content,
            score,
            distance,
            char_count,
            ingested_at,
        }
    }

    /// Similarity as a percentage for display
    pub fn similarity_percent(&self) -> f32 {
        self.score * 100.0
    }

    /// Format as a summary string for display
    pub fn format_summary(&self, max_content_len: usize) -> String {
        let content_preview = if self.content.chars().count() > max_content_len {
            let truncated: String = self.content.chars().take(max_content_len).collect();
            format!("{}...", truncated)
        } else {
            self.content.clone()
        };

        format!(
            "Score: {:.4} | {} (chunk {})\n{}\n",
            self.score, self.source_file, self.chunk_index, content_preview
        )
    }
}
