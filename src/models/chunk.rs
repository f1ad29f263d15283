// file: src/models/chunk.rs
// description: core chunk model with content hashing and serialization
// reference: internal data structures

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Supported source document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    Pdf,
    Text,
    Markdown,
}

impl FileType {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Text),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "txt",
            Self::Markdown => "md",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chunk of a source document, ready for embedding and storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub source_file: String,
    pub source_path: String,
    pub file_type: FileType,
    pub chunk_index: usize,
    pub content: String,
    pub content_hash: String,
    pub char_count: usize,
    pub ingested_at: u64,
    pub title: Option<String>,
}

impl DocumentChunk {
    pub fn new(
        source_file: String,
        source_path: String,
        file_type: FileType,
        chunk_index: usize,
        content: String,
        title: Option<String>,
    ) -> Self {
        let content_hash = Self::compute_hash(&content);
        let char_count = content.chars().count();
        let ingested_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            id: Uuid::new_v4().to_string(),
            source_file,
            source_path,
            file_type,
            chunk_index,
            content,
            content_hash,
            char_count,
            ingested_at,
            title,
        }
    }

    pub fn compute_hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_creation() {
        let chunk = DocumentChunk::new(
            "notes.md".to_string(),
            "/docs/notes.md".to_string(),
            FileType::Markdown,
            0,
            "# Test Content".to_string(),
            None,
        );

        assert_eq!(chunk.source_file, "notes.md");
        assert_eq!(chunk.chunk_index, 0);
        assert_eq!(chunk.char_count, 14);
        assert!(!chunk.content_hash.is_empty());
        assert!(!chunk.id.is_empty());
    }

    #[test]
    fn test_hash_consistency() {
        let hash1 = DocumentChunk::compute_hash("same text");
        let hash2 = DocumentChunk::compute_hash("same text");
        assert_eq!(hash1, hash2);
        assert_ne!(hash1, DocumentChunk::compute_hash("other text"));
    }

    #[test]
    fn test_file_type_from_extension() {
        assert_eq!(FileType::from_extension("pdf"), Some(FileType::Pdf));
        assert_eq!(FileType::from_extension("TXT"), Some(FileType::Text));
        assert_eq!(FileType::from_extension("md"), Some(FileType::Markdown));
        assert_eq!(
            FileType::from_extension("markdown"),
            Some(FileType::Markdown)
        );
        assert_eq!(FileType::from_extension("docx"), None);
    }

    #[test]
    fn test_unique_ids() {
        let a = DocumentChunk::new(
            "a.txt".into(),
            "/a.txt".into(),
            FileType::Text,
            0,
            "content".into(),
            None,
        );
        let b = DocumentChunk::new(
            "a.txt".into(),
            "/a.txt".into(),
            FileType::Text,
            1,
            "content".into(),
            None,
        );
        assert_ne!(a.id, b.id);
        assert_eq!(a.content_hash, b.content_hash);
    }
}
