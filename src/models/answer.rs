// file: src/models/answer.rs
// description: RAG answer and ingestion report models with stage timing
// reference: retrieval and generation results returned to the CLI

use crate::models::SearchResult;
use serde::{Deserialize, Serialize};

/// Result of a full retrieve-then-generate cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Generated answer text
    pub text: String,

    /// Retrieved passages the answer is grounded in
    pub sources: Vec<SearchResult>,

    /// Model that produced the answer
    pub model: String,

    /// Time spent embedding the query and searching, in milliseconds
    pub retrieval_time_ms: u64,

    /// Time spent in Ollama generation, in milliseconds
    pub generation_time_ms: u64,
}

impl Answer {
    pub fn total_time_ms(&self) -> u64 {
        self.retrieval_time_ms + self.generation_time_ms
    }

    /// An answer produced without calling the model because retrieval
    /// returned nothing.
    pub fn no_sources(model: String, retrieval_time_ms: u64) -> Self {
        Self {
            text: "No relevant documents found in the database.".to_string(),
            sources: Vec::new(),
            model,
            retrieval_time_ms,
            generation_time_ms: 0,
        }
    }

    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }
}

/// Summary of one ingestion run, with per-stage timing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    pub files_processed: usize,
    pub files_failed: usize,
    pub chunks_created: usize,
    pub embedding_time_ms: u64,
    pub storage_time_ms: u64,
    pub total_time_ms: u64,
    /// Total chunks in the database after the run
    pub db_chunk_count: u64,
}

impl IngestReport {
    pub fn merge(&mut self, other: &IngestReport) {
        self.files_processed += other.files_processed;
        self.files_failed += other.files_failed;
        self.chunks_created += other.chunks_created;
        self.embedding_time_ms += other.embedding_time_ms;
        self.storage_time_ms += other.storage_time_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_time() {
        let answer = Answer {
            text: "42".to_string(),
            sources: vec![],
            model: "mistral".to_string(),
            retrieval_time_ms: 120,
            generation_time_ms: 880,
        };
        assert_eq!(answer.total_time_ms(), 1000);
    }

    #[test]
    fn test_no_sources_answer() {
        let answer = Answer::no_sources("mistral".to_string(), 35);
        assert!(!answer.has_sources());
        assert_eq!(answer.generation_time_ms, 0);
        assert!(answer.text.contains("No relevant documents"));
    }

    #[test]
    fn test_report_merge() {
        let mut a = IngestReport {
            files_processed: 1,
            chunks_created: 10,
            embedding_time_ms: 100,
            storage_time_ms: 20,
            ..Default::default()
        };
        let b = IngestReport {
            files_processed: 2,
            files_failed: 1,
            chunks_created: 5,
            embedding_time_ms: 50,
            storage_time_ms: 10,
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.files_processed, 3);
        assert_eq!(a.files_failed, 1);
        assert_eq!(a.chunks_created, 15);
        assert_eq!(a.embedding_time_ms, 150);
        assert_eq!(a.storage_time_ms, 30);
    }
}
