//! Document question answering over a single local index.
//!
//! Ingestion parses a document into pages, chunks the pages into
//! overlapping passages, embeds them and atomically replaces the persisted
//! index. Questions reload that index, retrieve the closest passages and
//! have a language model answer from them, with page citations.

pub mod chunk;
pub mod config;
pub mod embeddings;
pub mod index;
pub mod parser;
pub mod progress;
pub mod rag;
pub mod types;
pub mod upload;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use chunk::Chunker;
pub use config::{RagSettings, StoragePaths};
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use index::{IndexMetadata, SimilarityMetric, VectorIndex};
pub use progress::{ProgressEvent, ProgressReporter};
pub use rag::{ask, ask_streaming, AnswerSynthesizer, CitationResolver, Retriever};
pub use types::{AskResponse, Citation, IndexStats, IngestStats, PageText, Passage, ScoredPassage};
pub use upload::save_uploaded_file;

use docqa_core::{AppError, AppResult};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Ingest `document` and replace the persisted index with it.
///
/// Nothing is persisted unless every step succeeds, so a failed ingestion
/// leaves the previous index in place.
pub async fn ingest(
    document: &Path,
    paths: &StoragePaths,
    settings: &RagSettings,
    provider: &dyn EmbeddingProvider,
    batch_size: usize,
    reporter: &ProgressReporter,
) -> AppResult<IngestStats> {
    let start = Instant::now();
    let chunker = Chunker::new(settings)?;

    tracing::info!("Ingesting document {:?}", document);

    let (pages, bytes) = read_document(document.to_path_buf()).await?;
    let pages_count = pages.len() as u32;
    let file_label = document
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| document.display().to_string());
    reporter.parse(pages_count as u64, &file_label);

    let passages = chunker.chunk(&pages);
    reporter.chunk(pages_count as u64, passages.len() as u64);

    if passages.is_empty() {
        return Err(AppError::Ingestion(format!(
            "No text could be extracted from {:?}",
            document
        )));
    }

    let passages_count = passages.len() as u32;
    let metadata = IndexMetadata::new(
        provider,
        document.to_path_buf(),
        sha256_hex(&bytes),
        pages_count,
    );

    let index = VectorIndex::build(passages, provider, batch_size, metadata, reporter).await?;

    reporter.persist(passages_count as u64, &paths.index_file().display().to_string());
    index.persist(&paths.index_dir)?;

    let stats = IngestStats {
        source_document: document.to_path_buf(),
        pages_count,
        passages_count,
        dimensions: index.dimensions(),
        bytes_processed: bytes.len() as u64,
        duration_secs: start.elapsed().as_secs_f64(),
    };

    tracing::info!(
        "Ingestion complete: {} pages, {} passages, {} bytes in {:.2}s",
        stats.pages_count,
        stats.passages_count,
        stats.bytes_processed,
        stats.duration_secs
    );

    Ok(stats)
}

/// Store uploaded bytes, then ingest the stored file.
pub async fn upload(
    file_name: &str,
    bytes: &[u8],
    paths: &StoragePaths,
    settings: &RagSettings,
    provider: &dyn EmbeddingProvider,
    batch_size: usize,
    reporter: &ProgressReporter,
) -> AppResult<IngestStats> {
    let stored = save_uploaded_file(&paths.uploads_dir, file_name, bytes)?;
    ingest(&stored, paths, settings, provider, batch_size, reporter).await
}

/// Describe the persisted index.
pub fn stats(paths: &StoragePaths) -> AppResult<IndexStats> {
    let index = VectorIndex::load(&paths.index_dir)?;
    let metadata = index.metadata();

    let index_size_bytes = std::fs::metadata(paths.index_file())
        .map(|m| m.len())
        .unwrap_or(0);

    Ok(IndexStats {
        source_document: metadata.source_document.clone(),
        passages_count: index.len() as u32,
        pages_count: metadata.pages_count,
        dimensions: index.dimensions(),
        metric: index.metric().as_str().to_string(),
        embedding_provider: metadata.embedding_provider.clone(),
        embedding_model: metadata.embedding_model.clone(),
        built_at: metadata.built_at,
        index_size_bytes,
    })
}

/// Delete the persisted index. Returns whether one existed.
pub fn clean(paths: &StoragePaths) -> AppResult<bool> {
    let removed = index::remove_index(&paths.index_dir)?;

    if removed {
        tracing::info!("Index removed from {:?}", paths.index_dir);
    } else {
        tracing::info!("No index to remove at {:?}", paths.index_dir);
    }

    Ok(removed)
}

/// Parse pages and read raw bytes off the async runtime.
async fn read_document(path: PathBuf) -> AppResult<(Vec<PageText>, Vec<u8>)> {
    tokio::task::spawn_blocking(move || -> AppResult<(Vec<PageText>, Vec<u8>)> {
        let pages = parser::parse_document(&path)?;
        let bytes = std::fs::read(&path)?;
        Ok((pages, bytes))
    })
    .await
    .map_err(|e| AppError::Ingestion(format!("Document parsing task failed: {}", e)))?
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
