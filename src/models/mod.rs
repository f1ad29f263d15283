// file: src/models/mod.rs
// description: data model module exports

pub mod answer;
pub mod chunk;
pub mod search_result;

pub use answer::{Answer, IngestReport};
pub use chunk::{DocumentChunk, FileType};
pub use search_result::SearchResult;
