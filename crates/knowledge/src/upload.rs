//! Storage of uploaded documents.
//!
//! Ingestion needs a readable path, so uploaded bytes are written to the
//! uploads directory first.

use docqa_core::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Write `bytes` to `uploads_dir` under the base name of `file_name`.
///
/// Any directory components in `file_name` are dropped. An existing file
/// with the same name is replaced. Returns the stored path.
pub fn save_uploaded_file(uploads_dir: &Path, file_name: &str, bytes: &[u8]) -> AppResult<PathBuf> {
    let base_name = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::Ingestion(format!("Invalid upload file name: {:?}", file_name)))?;

    if bytes.is_empty() {
        return Err(AppError::Ingestion(format!(
            "Uploaded file '{}' is empty",
            base_name
        )));
    }

    fs::create_dir_all(uploads_dir)?;
    let target = uploads_dir.join(base_name);
    fs::write(&target, bytes)?;

    tracing::info!(
        "Stored upload '{}' ({} bytes) at {:?}",
        base_name,
        bytes.len(),
        target
    );

    Ok(target)
}
