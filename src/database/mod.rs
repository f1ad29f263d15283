// file: src/database/mod.rs
// description: LanceDB storage module exports

pub mod client;
pub mod insert;
pub mod schema;

pub use client::LanceDbClient;
pub use insert::{ChunkInserter, InsertStats};
pub use schema::SchemaManager;
