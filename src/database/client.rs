// file: src/database/client.rs
// description: LanceDB client wrapper with connection management
// reference: https://docs.rs/lancedb

use crate::config::DatabaseConfig;
use crate::error::{ChatError, Result};
use crate::models::SearchResult;
use arrow_array::{Array, Float32Array, StringArray, UInt64Array};
use futures::StreamExt;
use lancedb::query::{ExecutableQuery, QueryBase, Select};
use lancedb::{Connection, Table, connect};
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct LanceDbClient {
    connection: Connection,
    config: DatabaseConfig,
}

impl LanceDbClient {
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        info!("Connecting to LanceDB at {}", config.uri);

        let connection = connect(&config.uri)
            .execute()
            .await
            .map_err(|e| ChatError::Database(format!("Failed to connect to LanceDB: {}", e)))?;

        Ok(Self { connection, config })
    }

    pub fn get_connection(&self) -> &Connection {
        &self.connection
    }

    pub async fn ping(&self) -> Result<bool> {
        debug!("Checking LanceDB connection");

        // Try to list tables as a ping equivalent
        match self.connection.table_names().execute().await {
            Ok(_) => {
                debug!("LanceDB connection successful");
                Ok(true)
            }
            Err(e) => Err(ChatError::Database(format!(
                "LanceDB connection failed: {}",
                e
            ))),
        }
    }

    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| ChatError::Database(format!("Failed to list tables: {}", e)))?;

        Ok(table_names.iter().any(|name| name == table_name))
    }

    pub async fn get_table(&self, table_name: &str) -> Result<Table> {
        self.connection
            .open_table(table_name)
            .execute()
            .await
            .map_err(|e| {
                ChatError::Database(format!("Failed to open table {}: {}", table_name, e))
            })
    }

    pub async fn chunk_count(&self) -> Result<u64> {
        if !self.table_exists(&self.config.table_name).await? {
            return Ok(0);
        }

        let table = self.get_table(&self.config.table_name).await?;
        let count = table
            .count_rows(None)
            .await
            .map_err(|e| ChatError::Database(format!("Failed to count rows: {}", e)))?;

        Ok(count as u64)
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    pub fn table_name(&self) -> &str {
        &self.config.table_name
    }

    pub fn uri(&self) -> &str {
        &self.config.uri
    }

    /// Content hashes of every stored chunk, used to skip re-ingestion.
    pub async fn existing_hashes(&self) -> Result<Vec<String>> {
        if !self.table_exists(&self.config.table_name).await? {
            return Ok(Vec::new());
        }

        let table = self.get_table(&self.config.table_name).await?;

        let mut stream = table
            .query()
            .select(Select::Columns(vec!["content_hash".to_string()]))
            .execute()
            .await
            .map_err(|e| ChatError::Database(format!("Failed to query hashes: {}", e)))?;

        let mut hashes = Vec::new();
        while let Some(batch_result) = stream.next().await {
            let batch = batch_result
                .map_err(|e| ChatError::Database(format!("Failed to read hash batch: {}", e)))?;

            let column = batch
                .column_by_name("content_hash")
                .ok_or_else(|| ChatError::Database("Missing 'content_hash' column".to_string()))?
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| {
                    ChatError::Database("Invalid 'content_hash' column type".to_string())
                })?;

            for i in 0..column.len() {
                hashes.push(column.value(i).to_string());
            }
        }

        Ok(hashes)
    }

    /// Delete all chunks belonging to a specific source file
    pub async fn delete_by_source(&self, source_file: &str) -> Result<()> {
        if !self.table_exists(&self.config.table_name).await? {
            info!("Table does not exist, nothing to delete");
            return Ok(());
        }

        let table = self.get_table(&self.config.table_name).await?;

        let predicate = format!("source_file = '{}'", source_file.replace('\'', "''"));
        info!("Deleting chunks with predicate: {}", predicate);

        table.delete(&predicate).await.map_err(|e| {
            ChatError::Database(format!(
                "Failed to delete chunks for source {}: {}",
                source_file, e
            ))
        })?;

        Ok(())
    }

    /// Search for chunks by vector similarity
    ///
    /// # Arguments
    /// * `query_embedding` - The query vector to search for
    /// * `limit` - Maximum number of results to return
    /// * `source_filter` - Optional source file name to filter results
    ///
    /// # Returns
    /// Vector of SearchResult ordered by similarity (highest first)
    pub async fn vector_search(
        &self,
        query_embedding: Vec<f32>,
        limit: usize,
        source_filter: Option<&str>,
    ) -> Result<Vec<SearchResult>> {
        if !self.table_exists(&self.config.table_name).await? {
            warn!("Table does not exist, returning empty results");
            return Ok(Vec::new());
        }

        let table = self.get_table(&self.config.table_name).await?;

        debug!("Performing vector search with limit {}", limit);

        let mut query = table
            .vector_search(query_embedding)
            .map_err(|e| ChatError::Database(format!("Failed to create vector search: {}", e)))?
            .limit(limit);

        if let Some(source) = source_filter {
            let filter = format!("source_file = '{}'", source.replace('\'', "''"));
            query = query.only_if(&filter);
            debug!("Applied filter: {}", filter);
        }

        let mut results_stream = query
            .execute()
            .await
            .map_err(|e| ChatError::Database(format!("Vector search failed: {}", e)))?;

        let mut search_results = Vec::new();

        while let Some(batch_result) = results_stream.next().await {
            let batch = batch_result
                .map_err(|e| ChatError::Database(format!("Failed to read result batch: {}", e)))?;

            let num_rows = batch.num_rows();

            let ids = Self::string_column(&batch, "id")?;
            let source_files = Self::string_column(&batch, "source_file")?;
            let contents = Self::string_column(&batch, "content")?;
            let chunk_indices = Self::u64_column(&batch, "chunk_index")?;
            let char_counts = Self::u64_column(&batch, "char_count")?;
            let ingested_ats = Self::u64_column(&batch, "ingested_at")?;

            // LanceDB returns distance score in a special column
            let distances = batch
                .column_by_name("_distance")
                .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

            for i in 0..num_rows {
                // Convert distance to similarity (lower distance = higher similarity)
                let (score, distance) = if let Some(dist_array) = distances {
                    let dist = dist_array.value(i);
                    let similarity = 1.0 / (1.0 + dist);
                    (similarity, Some(dist))
                } else {
                    (1.0, None)
                };

                search_results.push(SearchResult::new(
                    ids.value(i).to_string(),
                    source_files.value(i).to_string(),
                    chunk_indices.value(i) as usize,
                    contents.value(i).to_string(),
                    score,
                    distance,
                    char_counts.value(i) as usize,
                    ingested_ats.value(i),
                ));
            }
        }

        debug!("Vector search returned {} results", search_results.len());
        Ok(search_results)
    }

    fn string_column<'b>(
        batch: &'b arrow_array::RecordBatch,
        name: &str,
    ) -> Result<&'b StringArray> {
        batch
            .column_by_name(name)
            .ok_or_else(|| ChatError::Database(format!("Missing '{}' column", name)))?
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| ChatError::Database(format!("Invalid '{}' column type", name)))
    }

    fn u64_column<'b>(batch: &'b arrow_array::RecordBatch, name: &str) -> Result<&'b UInt64Array> {
        batch
            .column_by_name(name)
            .ok_or_else(|| ChatError::Database(format!("Missing '{}' column", name)))?
            .as_any()
            .downcast_ref::<UInt64Array>()
            .ok_or_else(|| ChatError::Database(format!("Invalid '{}' column type", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config() {
        let config = DatabaseConfig {
            uri: "memory://test".to_string(),
            table_name: "test_table".to_string(),
            batch_size: 64,
        };

        assert_eq!(config.uri, "memory://test");
        assert_eq!(config.table_name, "test_table");
    }

    #[tokio::test]
    async fn test_in_memory_connection() {
        let config = DatabaseConfig {
            uri: "memory://".to_string(),
            table_name: "chunks".to_string(),
            batch_size: 64,
        };

        let client = LanceDbClient::new(config).await.unwrap();
        assert!(client.ping().await.unwrap());
        assert!(!client.table_exists("chunks").await.unwrap());
        assert_eq!(client.chunk_count().await.unwrap(), 0);
        assert!(client.existing_hashes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_on_empty_database() {
        let config = DatabaseConfig {
            uri: "memory://".to_string(),
            table_name: "chunks".to_string(),
            batch_size: 64,
        };

        let client = LanceDbClient::new(config).await.unwrap();
        let results = client
            .vector_search(vec![0.0; 8], 5, None)
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
