// file: src/pipeline/ingest.rs
// description: coordinates document loading, chunking, embedding, and storage
// reference: orchestrates the asynchronous ingestion workflow

use crate::config::Config;
use crate::database::{ChunkInserter, LanceDbClient};
use crate::error::{ChatError, Result};
use crate::loader::{DocumentLoader, FileScanner, LoadedDocument};
use crate::models::{DocumentChunk, IngestReport};
use crate::ollama::OllamaEmbeddingClient;
use crate::pipeline::progress::ProgressTracker;
use crate::splitter::TextSplitter;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct IngestPipeline {
    config: Config,
    client: LanceDbClient,
    splitter: Arc<TextSplitter>,
    embedder: Arc<OllamaEmbeddingClient>,
}

struct FileOutcome {
    report: IngestReport,
    bytes: u64,
}

impl IngestPipeline {
    pub async fn new(config: Config) -> Result<Self> {
        let client = LanceDbClient::new(config.database.clone()).await?;
        let splitter = Arc::new(TextSplitter::new(
            config.chunking.chunk_size,
            config.chunking.chunk_overlap,
        ));
        let embedder = Arc::new(OllamaEmbeddingClient::new(&config.ollama));

        Ok(Self {
            config,
            client,
            splitter,
            embedder,
        })
    }

    pub fn client(&self) -> &LanceDbClient {
        &self.client
    }

    /// Ingest files and directories: load, chunk, embed, and store each
    /// supported document. Already-stored chunks (by content hash) are
    /// skipped unless `force` is set.
    pub async fn run(&self, paths: &[PathBuf], force: bool) -> Result<IngestReport> {
        let start = Instant::now();
        let files = self.collect_files(paths)?;

        if files.is_empty() {
            warn!("No supported documents found to ingest");
            return Ok(IngestReport::default());
        }

        info!(
            "Ingesting {} files with model {} ({} dimensions)",
            files.len(),
            self.embedder.model_name(),
            self.embedder.dimensions()
        );

        let force = force || self.config.pipeline.force_reprocess;
        let existing: Arc<HashSet<String>> = if force {
            Arc::new(HashSet::new())
        } else {
            Arc::new(self.client.existing_hashes().await?.into_iter().collect())
        };

        let progress = Arc::new(ProgressTracker::new(files.len()));
        let parallel_workers = self.config.pipeline.parallel_workers.max(1);

        let outcomes: Vec<Option<FileOutcome>> = stream::iter(files.into_iter().map(|path| {
            let client = self.client.clone();
            let splitter = Arc::clone(&self.splitter);
            let embedder = Arc::clone(&self.embedder);
            let existing = Arc::clone(&existing);
            let progress = Arc::clone(&progress);

            async move {
                progress.set_message(format!("Processing {}", path.display()));

                let result =
                    ingest_single_file(&client, &splitter, &embedder, &existing, &path).await;

                match result {
                    Ok(outcome) => {
                        progress.inc_files_processed();
                        progress.add_chunks(outcome.report.chunks_created);
                        progress.add_bytes_processed(outcome.bytes);
                        Some(outcome)
                    }
                    Err(e) => {
                        progress.inc_files_failed();
                        warn!("Failed to ingest {}: {}", path.display(), e);
                        None
                    }
                }
            }
        }))
        .buffer_unordered(parallel_workers)
        .collect()
        .await;

        progress.finish();

        let stats = progress.get_stats();
        debug!(
            "Pipeline throughput: {:.2} files/sec, {:.1}% success, {} bytes",
            stats.files_per_second(),
            stats.success_rate(),
            stats.total_bytes_processed
        );

        let mut report = IngestReport::default();
        for outcome in outcomes {
            match outcome {
                Some(o) => report.merge(&o.report),
                None => report.files_failed += 1,
            }
        }

        report.total_time_ms = start.elapsed().as_millis() as u64;
        report.db_chunk_count = self.client.chunk_count().await?;

        info!(
            "Ingestion complete: {} files, {} chunks in {:.2}s (embedding {:.2}s, storage {:.2}s)",
            report.files_processed,
            report.chunks_created,
            report.total_time_ms as f64 / 1000.0,
            report.embedding_time_ms as f64 / 1000.0,
            report.storage_time_ms as f64 / 1000.0
        );

        Ok(report)
    }

    /// Expand the given paths into the list of files to process.
    /// Directories are scanned recursively; explicit files must be supported.
    fn collect_files(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let scanner = FileScanner::new(self.config.pipeline.clone());
        let mut files = Vec::new();

        for path in paths {
            if path.is_dir() {
                let scanned = scanner.scan_directory(path)?;
                for file in &scanned {
                    debug!("Queued {}", file.relative_path);
                }
                files.extend(scanned.into_iter().map(|f| f.path));
            } else if path.is_file() {
                files.push(path.clone());
            } else {
                return Err(ChatError::Validation(format!(
                    "Path does not exist: {}",
                    path.display()
                )));
            }
        }

        Ok(files)
    }
}

async fn ingest_single_file(
    client: &LanceDbClient,
    splitter: &TextSplitter,
    embedder: &OllamaEmbeddingClient,
    existing: &HashSet<String>,
    path: &Path,
) -> Result<FileOutcome> {
    // PDF extraction and file IO are blocking work
    let document = load_blocking(path.to_path_buf()).await?;
    let bytes = document.text.len() as u64;

    let chunks = split_document(splitter, &document, existing);

    if chunks.is_empty() {
        debug!(
            "No new chunks for {} (already ingested or empty)",
            document.source_file
        );
        return Ok(FileOutcome {
            report: IngestReport {
                files_processed: 1,
                ..Default::default()
            },
            bytes,
        });
    }

    info!(
        "Document {} split into {} chunks",
        document.source_file,
        chunks.len()
    );

    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();

    let stats = splitter.stats(&texts);
    debug!(
        "Chunk sizes for {}: avg {} chars (min {}, max {})",
        document.source_file, stats.avg_chunk_size, stats.min_chunk_size, stats.max_chunk_size
    );

    let embed_start = Instant::now();
    let embeddings = embedder.embed_batch_or_fallback(&texts).await;
    let embedding_time_ms = embed_start.elapsed().as_millis() as u64;

    let inserter = ChunkInserter::new(client);
    let insert_stats = inserter.insert_chunks(&chunks, embeddings).await?;

    Ok(FileOutcome {
        report: IngestReport {
            files_processed: 1,
            files_failed: 0,
            chunks_created: insert_stats.chunks_inserted,
            embedding_time_ms,
            storage_time_ms: insert_stats.storage_time_ms,
            total_time_ms: 0,
            db_chunk_count: 0,
        },
        bytes,
    })
}

async fn load_blocking(path: PathBuf) -> Result<LoadedDocument> {
    tokio::task::spawn_blocking(move || {
        let loader = DocumentLoader::new();
        loader.load(&path)
    })
    .await
    .map_err(|e| ChatError::Validation(format!("Document loading task failed: {}", e)))?
}

fn split_document(
    splitter: &TextSplitter,
    document: &LoadedDocument,
    existing: &HashSet<String>,
) -> Vec<DocumentChunk> {
    splitter
        .split(&document.text)
        .into_iter()
        .enumerate()
        .map(|(index, content)| {
            DocumentChunk::new(
                document.source_file.clone(),
                document.source_path.clone(),
                document.file_type,
                index,
                content,
                document.title.clone(),
            )
        })
        .filter(|chunk| !existing.contains(&chunk.content_hash))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileType;
    use std::fs;
    use tempfile::TempDir;

    fn test_config(db_uri: &str) -> Config {
        let mut config = Config::default_config();
        config.database.uri = db_uri.to_string();
        // Unreachable Ollama forces deterministic fallback embeddings
        config.ollama.base_url = "http://127.0.0.1:1".to_string();
        config.ollama.embedding_dim = 8;
        config.ollama.request_timeout_secs = 1;
        config.chunking.chunk_size = 50;
        config.chunking.chunk_overlap = 10;
        config
    }

    #[test]
    fn test_split_document_filters_existing() {
        let splitter = TextSplitter::new(1000, 200);
        let document = LoadedDocument {
            source_file: "a.txt".to_string(),
            source_path: "/a.txt".to_string(),
            file_type: FileType::Text,
            text: "some content".to_string(),
            title: None,
        };

        let all = split_document(&splitter, &document, &HashSet::new());
        assert_eq!(all.len(), 1);

        let mut existing = HashSet::new();
        existing.insert(all[0].content_hash.clone());
        let filtered = split_document(&splitter, &document, &existing);
        assert!(filtered.is_empty());
    }

    #[tokio::test]
    async fn test_ingest_directory_end_to_end() {
        let temp = TempDir::new().unwrap();
        let docs = temp.path().join("docs");
        fs::create_dir(&docs).unwrap();
        fs::write(docs.join("a.txt"), "alpha beta gamma. ".repeat(20)).unwrap();
        fs::write(docs.join("b.md"), "# Title\n\nSome markdown body text.").unwrap();
        fs::write(docs.join("ignored.rs"), "fn main() {}").unwrap();

        let db_path = temp.path().join("lancedb");
        let config = test_config(db_path.to_str().unwrap());
        let pipeline = IngestPipeline::new(config).await.unwrap();

        let report = pipeline.run(&[docs.clone()], false).await.unwrap();

        assert_eq!(report.files_processed, 2);
        assert_eq!(report.files_failed, 0);
        assert!(report.chunks_created > 0);
        assert_eq!(report.db_chunk_count, report.chunks_created as u64);

        // Re-running without force skips everything by content hash
        let second = pipeline.run(&[docs], false).await.unwrap();
        assert_eq!(second.files_processed, 2);
        assert_eq!(second.chunks_created, 0);
        assert_eq!(second.db_chunk_count, report.db_chunk_count);
    }

    #[tokio::test]
    async fn test_ingest_missing_path_is_error() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("lancedb");
        let config = test_config(db_path.to_str().unwrap());
        let pipeline = IngestPipeline::new(config).await.unwrap();

        let result = pipeline
            .run(&[PathBuf::from("/nonexistent/docs")], false)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_force_reingests_chunks() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "repeatable content").unwrap();

        let db_path = temp.path().join("lancedb");
        let config = test_config(db_path.to_str().unwrap());
        let pipeline = IngestPipeline::new(config).await.unwrap();

        let file = temp.path().join("a.txt");
        let first = pipeline.run(std::slice::from_ref(&file), false).await.unwrap();
        let second = pipeline.run(std::slice::from_ref(&file), true).await.unwrap();

        assert_eq!(first.chunks_created, second.chunks_created);
        assert_eq!(
            second.db_chunk_count,
            (first.chunks_created + second.chunks_created) as u64
        );
    }
}
