// file: src/loader/pdf.rs
// description: PDF text extraction
// reference: https://docs.rs/pdf-extract

use crate::error::{ChatError, Result};
use std::path::Path;
use tracing::debug;

pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load(&self, path: &Path) -> Result<String> {
        let text = pdf_extract::extract_text(path).map_err(|e| ChatError::DocumentLoad {
            file: path.display().to_string(),
            message: format!("PDF extraction failed: {}", e),
        })?;

        let cleaned = Self::clean_text(&text);

        if cleaned.trim().is_empty() {
            return Err(ChatError::DocumentLoad {
                file: path.display().to_string(),
                message: "PDF contains no extractable text".to_string(),
            });
        }

        debug!(
            "Extracted {} chars of text from {}",
            cleaned.len(),
            path.display()
        );

        Ok(cleaned)
    }

    /// Collapse the excessive blank lines PDF extraction tends to produce
    /// while preserving paragraph breaks for the splitter.
    fn clean_text(text: &str) -> String {
        let mut cleaned = String::with_capacity(text.len());
        let mut blank_run = 0usize;

        for line in text.lines() {
            let trimmed = line.trim_end();
            if trimmed.is_empty() {
                blank_run += 1;
                if blank_run == 1 {
                    cleaned.push('\n');
                }
            } else {
                blank_run = 0;
                cleaned.push_str(trimmed);
                cleaned.push('\n');
            }
        }

        cleaned.trim().to_string()
    }
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self::new()
    }
}
