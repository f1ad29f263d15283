// file: src/pipeline/mod.rs
// description: ingestion pipeline module exports

pub mod ingest;
pub mod progress;

pub use ingest::IngestPipeline;
pub use progress::{PipelineStats, ProgressTracker};
