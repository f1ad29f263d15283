// file: src/loader/scanner.rs
// description: Directory walking and file discovery with filtering
// reference: https://docs.rs/walkdir

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::FileType;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub struct FileScanner {
    config: PipelineConfig,
}

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub relative_path: String,
}

impl FileScanner {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Collect supported document files under a directory.
    pub fn scan_directory(&self, root: &Path) -> Result<Vec<ScannedFile>> {
        info!("Scanning directory: {}", root.display());
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();

            if self.should_skip(path) {
                debug!("Skipping file: {}", path.display());
                continue;
            }

            if !Self::is_supported(path) {
                continue;
            }

            let Ok(metadata) = entry.metadata() else {
                continue;
            };

            let size = metadata.len();
            let max_size = (self.config.max_file_size_mb * 1024 * 1024) as u64;

            if size > max_size {
                debug!(
                    "Skipping large file ({} MB): {}",
                    size / 1024 / 1024,
                    path.display()
                );
                continue;
            }

            let relative_path = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .to_string();

            files.push(ScannedFile {
                path: path.to_path_buf(),
                relative_path,
            });
        }

        info!("Found {} supported document files", files.len());
        Ok(files)
    }

    fn is_supported(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(FileType::from_extension)
            .is_some()
    }

    fn should_skip(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.config.skip_patterns {
            if pattern.contains('*') {
                let pattern_without_star = pattern.replace('*', "");
                if !pattern_without_star.is_empty() && path_str.contains(&pattern_without_star) {
                    return true;
                }
            } else if path_str.contains(pattern.as_str()) {
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn test_config() -> PipelineConfig {
        PipelineConfig {
            parallel_workers: 1,
            skip_patterns: vec![],
            force_reprocess: false,
            max_file_size_mb: 10,
        }
    }

    #[test]
    fn test_scan_directory_finds_supported_types() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.md"), "# A").unwrap();
        fs::write(temp.path().join("b.txt"), "B").unwrap();
        fs::write(temp.path().join("c.pdf"), "%PDF-1.4").unwrap();
        fs::write(temp.path().join("d.rs"), "fn main() {}").unwrap();

        let scanner = FileScanner::new(test_config());
        let mut files = scanner.scan_directory(temp.path()).unwrap();
        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        let names: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(names, vec!["a.md", "b.txt", "c.pdf"]);
    }

    #[test]
    fn test_skip_patterns() {
        let mut config = test_config();
        config.skip_patterns = vec!["*.zip".to_string(), ".git/".to_string()];
        let scanner = FileScanner::new(config);

        assert!(scanner.should_skip(Path::new("archive.zip")));
        assert!(scanner.should_skip(Path::new(".git/config")));
        assert!(!scanner.should_skip(Path::new("notes.md")));
    }

    #[test]
    fn test_large_files_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("big.txt"), "x".repeat(2 * 1024 * 1024)).unwrap();

        let mut config = test_config();
        config.max_file_size_mb = 1;

        let scanner = FileScanner::new(config);
        let files = scanner.scan_directory(temp.path()).unwrap();
        assert!(files.is_empty());
    }
}
