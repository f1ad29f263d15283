// file: src/loader/text.rs
// description: plain text loading with UTF-8 validation

use crate::error::{ChatError, Result};
use std::fs;
use std::path::Path;

pub struct TextLoader;

impl TextLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).map_err(|source| ChatError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;

        if content.trim().is_empty() {
            return Err(ChatError::DocumentLoad {
                file: path.display().to_string(),
                message: "file contains no text".to_string(),
            });
        }

        Ok(content)
    }
}

impl Default for TextLoader {
    fn default() -> Self {
        Self::new()
    }
}
