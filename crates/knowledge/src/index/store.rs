//! Durable storage for the vector index.
//!
//! File layout: 4 magic bytes, little-endian `u32` format version, one
//! metric tag byte, then the bincode-encoded index. Writers go through a
//! uniquely named temp file that is renamed over `index.bin`, so readers
//! only ever see a complete index and concurrent writers never interleave.

use super::{SimilarityMetric, VectorIndex};
use crate::config::INDEX_FILE_NAME;
use docqa_core::{AppError, AppResult};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const MAGIC: &[u8; 4] = b"DQIX";
pub const FORMAT_VERSION: u32 = 1;

const TEMP_PREFIX: &str = ".index.bin.";
const TEMP_SUFFIX: &str = ".tmp";

fn metric_tag(metric: SimilarityMetric) -> u8 {
    match metric {
        SimilarityMetric::Cosine => 1,
    }
}

fn metric_from_tag(tag: u8) -> Option<SimilarityMetric> {
    match tag {
        1 => Some(SimilarityMetric::Cosine),
        _ => None,
    }
}

impl VectorIndex {
    /// Persist the index under `dir`, atomically replacing any previous one.
    ///
    /// Returns the path of the index file.
    pub fn persist(&self, dir: &Path) -> AppResult<PathBuf> {
        fs::create_dir_all(dir)?;

        let target = dir.join(INDEX_FILE_NAME);
        let tmp = dir.join(format!(
            "{}{}.{}{}",
            TEMP_PREFIX,
            std::process::id(),
            uuid::Uuid::new_v4().simple(),
            TEMP_SUFFIX
        ));

        if let Err(e) = self.write_to(&tmp) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }

        if let Err(e) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(AppError::Io(e));
        }

        tracing::info!(
            passages = self.len(),
            path = %target.display(),
            "Vector index persisted"
        );

        Ok(target)
    }

    fn write_to(&self, path: &Path) -> AppResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(MAGIC)?;
        writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
        writer.write_all(&[metric_tag(self.metric)])?;
        bincode::serialize_into(&mut writer, self)?;

        let file = writer.into_inner().map_err(|e| AppError::Io(e.into_error()))?;
        file.sync_all()?;
        Ok(())
    }

    /// Load the index persisted under `dir`.
    ///
    /// Fails with `IndexNotFound` when nothing has been persisted and with
    /// `Index` when the file is corrupt or from an incompatible version.
    pub fn load(dir: &Path) -> AppResult<Self> {
        let path = dir.join(INDEX_FILE_NAME);
        if !path.exists() {
            return Err(AppError::IndexNotFound(path.display().to_string()));
        }

        let mut reader = BufReader::new(File::open(&path)?);

        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|e| AppError::Index(format!("Failed to read index header: {}", e)))?;
        if &magic != MAGIC {
            return Err(AppError::Index(
                "Invalid index file (bad magic bytes)".to_string(),
            ));
        }

        let mut version_bytes = [0u8; 4];
        reader
            .read_exact(&mut version_bytes)
            .map_err(|e| AppError::Index(format!("Failed to read index version: {}", e)))?;
        let version = u32::from_le_bytes(version_bytes);
        if version != FORMAT_VERSION {
            return Err(AppError::Index(format!(
                "Unsupported index version: {} (expected {})",
                version, FORMAT_VERSION
            )));
        }

        let mut tag = [0u8; 1];
        reader
            .read_exact(&mut tag)
            .map_err(|e| AppError::Index(format!("Failed to read index metric: {}", e)))?;
        let header_metric = metric_from_tag(tag[0])
            .ok_or_else(|| AppError::Index(format!("Unknown similarity metric tag: {}", tag[0])))?;

        let index: VectorIndex = bincode::deserialize_from(&mut reader)
            .map_err(|e| AppError::Index(format!("Failed to decode index: {}", e)))?;

        if index.metric != header_metric {
            return Err(AppError::Index(format!(
                "Index header metric {} does not match body metric {}",
                header_metric.as_str(),
                index.metric.as_str()
            )));
        }

        if let Some(entry) = index
            .entries
            .iter()
            .find(|e| e.vector.len() != index.dimensions)
        {
            return Err(AppError::Index(format!(
                "Entry {} has {} dimensions, index declares {}",
                entry.id,
                entry.vector.len(),
                index.dimensions
            )));
        }

        tracing::debug!(
            passages = index.len(),
            dimensions = index.dimensions,
            "Vector index loaded"
        );

        Ok(index)
    }
}

/// Delete the persisted index and any temp files left by interrupted
/// writers. Returns whether an index was removed.
pub fn remove_index(dir: &Path) -> AppResult<bool> {
    if !dir.exists() {
        return Ok(false);
    }

    let target = dir.join(INDEX_FILE_NAME);
    let removed = if target.exists() {
        fs::remove_file(&target)?;
        true
    } else {
        false
    };

    for entry in walkdir::WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_file()
            && name.starts_with(TEMP_PREFIX)
            && name.ends_with(TEMP_SUFFIX)
        {
            fs::remove_file(entry.path())?;
        }
    }

    Ok(removed)
}
