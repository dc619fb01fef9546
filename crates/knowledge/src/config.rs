//! Pipeline settings and storage locations.

use docqa_core::{AppConfig, AppError, AppResult};
use std::path::{Path, PathBuf};

/// File name of the persisted index inside the index directory.
pub const INDEX_FILE_NAME: &str = "index.bin";

/// Fixed retrieval and chunking parameters.
///
/// Built once and passed by reference into each component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RagSettings {
    /// Maximum passage length in characters
    pub chunk_size: usize,

    /// Characters shared by consecutive passages of a page
    pub chunk_overlap: usize,

    /// Passages retrieved per question
    pub top_k: usize,

    /// Resolution page images are expected to be rendered at.
    ///
    /// Rendering happens outside docqa; this value is the contract with the
    /// renderer that fills `pages/` and is reported by `docqa stats`.
    pub page_dpi: u32,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 100,
            top_k: 3,
            page_dpi: 250,
        }
    }
}

impl RagSettings {
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::Config("chunk size must be positive".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(AppError::Config("top_k must be positive".to_string()));
        }
        Ok(())
    }
}

/// Where the pipeline reads and writes its state.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub uploads_dir: PathBuf,
    pub index_dir: PathBuf,
    pub pages_dir: PathBuf,
    pub prompts_dir: PathBuf,
}

impl StoragePaths {
    /// Lay out every location under a single state directory.
    pub fn under(state_dir: &Path) -> Self {
        Self {
            uploads_dir: state_dir.join("uploads"),
            index_dir: state_dir.join("index"),
            pages_dir: state_dir.join("pages"),
            prompts_dir: state_dir.join("prompts"),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            uploads_dir: config.uploads_dir(),
            index_dir: config.index_dir(),
            pages_dir: config.pages_dir(),
            prompts_dir: config.prompts_dir(),
        }
    }

    /// Path of the persisted index file.
    pub fn index_file(&self) -> PathBuf {
        self.index_dir.join(INDEX_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = RagSettings::default();
        assert_eq!(settings.chunk_size, 800);
        assert_eq!(settings.chunk_overlap, 100);
        assert_eq!(settings.top_k, 3);
        assert_eq!(settings.page_dpi, 250);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let settings = RagSettings {
            chunk_overlap: 800,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_paths_follow_app_config() {
        let config = AppConfig {
            workspace: PathBuf::from("/tmp/ws"),
            ..Default::default()
        };
        let paths = StoragePaths::from_config(&config);
        assert_eq!(paths.index_file(), PathBuf::from("/tmp/ws/.docqa/index/index.bin"));
        assert_eq!(paths.pages_dir, PathBuf::from("/tmp/ws/.docqa/pages"));
    }
}
