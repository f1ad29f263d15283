// file: src/lib.rs
// description: library entry point and public api exports
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod chat;
pub mod config;
pub mod database;
pub mod error;
pub mod loader;
pub mod models;
pub mod ollama;
pub mod pipeline;
pub mod splitter;
pub mod utils;

pub use chat::ChatEngine;
pub use config::{ChunkingConfig, Config, DatabaseConfig, OllamaConfig, PipelineConfig};
pub use database::{ChunkInserter, InsertStats, LanceDbClient, SchemaManager};
pub use error::{ChatError, Result};
pub use loader::{DocumentLoader, FileScanner, LoadedDocument, ScannedFile};
pub use models::{Answer, DocumentChunk, FileType, IngestReport, SearchResult};
pub use ollama::{OllamaClient, OllamaEmbeddingClient, build_rag_prompt};
pub use pipeline::{IngestPipeline, PipelineStats, ProgressTracker};
pub use splitter::{ChunkStats, TextSplitter};
pub use utils::{
    HealthCheck, HealthReport, HealthStatus, OperationTimer, PerformanceMetrics, Validator,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let _config = Config::default_config();
        let _splitter = TextSplitter::new(1000, 200);
    }
}
