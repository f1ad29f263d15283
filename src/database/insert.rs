// file: src/database/insert.rs
// description: LanceDB batch insertion operations with vector embeddings
// reference: https://docs.rs/lancedb

use crate::database::client::LanceDbClient;
use crate::database::schema::SchemaManager;
use crate::error::{ChatError, Result};
use crate::models::DocumentChunk;
use arrow_array::{
    FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray, UInt64Array,
};
use lance_arrow::FixedSizeListArrayExt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

pub struct ChunkInserter<'a> {
    client: &'a LanceDbClient,
}

#[derive(Debug, Clone, Default)]
pub struct InsertStats {
    pub chunks_inserted: usize,
    pub storage_time_ms: u64,
}

impl<'a> ChunkInserter<'a> {
    pub fn new(client: &'a LanceDbClient) -> Self {
        Self { client }
    }

    /// Insert chunks with their embeddings, creating the table on first use.
    /// Chunk and embedding slices must be the same length.
    pub async fn insert_chunks(
        &self,
        chunks: &[DocumentChunk],
        embeddings: Vec<Vec<f32>>,
    ) -> Result<InsertStats> {
        if chunks.is_empty() {
            return Ok(InsertStats::default());
        }

        if chunks.len() != embeddings.len() {
            return Err(ChatError::Database(format!(
                "Chunk/embedding count mismatch: {} chunks, {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dim = embeddings[0].len();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dim) {
            return Err(ChatError::Database(format!(
                "Inconsistent embedding dimensions: expected {}, found {}",
                dim,
                bad.len()
            )));
        }

        let schema = SchemaManager::get_chunks_schema(dim);
        let start = Instant::now();
        let mut inserted = 0usize;

        for (chunk_batch, embedding_batch) in chunks
            .chunks(self.client.batch_size())
            .zip(embeddings.chunks(self.client.batch_size()))
        {
            let record_batch =
                Self::create_record_batch(schema.clone(), chunk_batch, embedding_batch)?;

            let table_name = self.client.table_name();

            if !self.client.table_exists(table_name).await? {
                // Create table with first batch
                self.client
                    .get_connection()
                    .create_table(
                        table_name,
                        RecordBatchIterator::new(vec![Ok(record_batch)], schema.clone()),
                    )
                    .execute()
                    .await
                    .map_err(|e| ChatError::Database(format!("Failed to create table: {}", e)))?;
                info!("Created new table: {}", table_name);
            } else {
                let table = self.client.get_table(table_name).await?;
                table
                    .add(RecordBatchIterator::new(
                        vec![Ok(record_batch)],
                        schema.clone(),
                    ))
                    .execute()
                    .await
                    .map_err(|e| ChatError::Database(format!("Failed to insert chunks: {}", e)))?;
            }

            inserted += chunk_batch.len();
        }

        let storage_time_ms = start.elapsed().as_millis() as u64;
        debug!("Inserted {} chunks in {}ms", inserted, storage_time_ms);

        Ok(InsertStats {
            chunks_inserted: inserted,
            storage_time_ms,
        })
    }

    /// Create an Arrow RecordBatch from chunks and embeddings
    fn create_record_batch(
        schema: Arc<arrow_schema::Schema>,
        chunks: &[DocumentChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<RecordBatch> {
        let ids: StringArray = chunks.iter().map(|c| Some(c.id.clone())).collect();

        let source_files: StringArray = chunks
            .iter()
            .map(|c| Some(c.source_file.clone()))
            .collect();

        let source_paths: StringArray = chunks
            .iter()
            .map(|c| Some(c.source_path.clone()))
            .collect();

        let file_types: StringArray = chunks
            .iter()
            .map(|c| Some(c.file_type.as_str().to_string()))
            .collect();

        let chunk_indices: UInt64Array =
            chunks.iter().map(|c| Some(c.chunk_index as u64)).collect();

        let contents: StringArray = chunks.iter().map(|c| Some(c.content.clone())).collect();

        let content_hashes: StringArray = chunks
            .iter()
            .map(|c| Some(c.content_hash.clone()))
            .collect();

        let char_counts: UInt64Array = chunks.iter().map(|c| Some(c.char_count as u64)).collect();

        let ingested_ats: UInt64Array = chunks.iter().map(|c| Some(c.ingested_at)).collect();

        let titles: StringArray = chunks.iter().map(|c| c.title.clone()).collect();

        // Build embedding array (FixedSizeList of Float32)
        let embedding_values: Float32Array = embeddings
            .iter()
            .flat_map(|emb| emb.iter().copied())
            .collect();

        let embedding_list =
            FixedSizeListArray::try_new_from_values(embedding_values, embeddings[0].len() as i32)
                .map_err(|e| {
                    ChatError::Database(format!("Failed to create embedding array: {}", e))
                })?;

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(ids),
                Arc::new(source_files),
                Arc::new(source_paths),
                Arc::new(file_types),
                Arc::new(chunk_indices),
                Arc::new(contents),
                Arc::new(content_hashes),
                Arc::new(char_counts),
                Arc::new(ingested_ats),
                Arc::new(titles),
                Arc::new(embedding_list),
            ],
        )
        .map_err(|e| ChatError::Database(format!("Failed to create record batch: {}", e)))
    }
}
