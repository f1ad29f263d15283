// file: src/loader/mod.rs
// description: document loading dispatched by file extension
// reference: loads pdf, txt, and markdown sources into plain text

pub mod markdown;
pub mod pdf;
pub mod scanner;
pub mod text;

pub use markdown::MarkdownLoader;
pub use pdf::PdfLoader;
pub use scanner::{FileScanner, ScannedFile};
pub use text::TextLoader;

use crate::error::{ChatError, Result};
use crate::models::FileType;
use std::path::Path;
use tracing::info;

/// A source document reduced to plain text, ready for chunking.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub source_file: String,
    pub source_path: String,
    pub file_type: FileType,
    pub text: String,
    pub title: Option<String>,
}

pub struct DocumentLoader {
    markdown: MarkdownLoader,
    pdf: PdfLoader,
    text: TextLoader,
}

impl DocumentLoader {
    pub fn new() -> Self {
        Self {
            markdown: MarkdownLoader::new(),
            pdf: PdfLoader::new(),
            text: TextLoader::new(),
        }
    }

    /// Load a single document, picking the loader from the file extension.
    pub fn load(&self, path: &Path) -> Result<LoadedDocument> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ChatError::UnsupportedFileType(path.display().to_string()))?;

        let file_type = FileType::from_extension(extension)
            .ok_or_else(|| ChatError::UnsupportedFileType(format!(".{}", extension)))?;

        info!("Loading document: {}", path.display());

        let (text, title) = match file_type {
            FileType::Pdf => (self.pdf.load(path)?, None),
            FileType::Text => (self.text.load(path)?, None),
            FileType::Markdown => {
                let parsed = self.markdown.load(path)?;
                (parsed.plain_text, parsed.title)
            }
        };

        let source_file = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(LoadedDocument {
            source_file,
            source_path: path.display().to_string(),
            file_type,
            text,
            title,
        })
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new()
    }
}
