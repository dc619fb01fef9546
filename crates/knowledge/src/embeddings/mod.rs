//! Embedding providers.
//!
//! Provider-agnostic embedding generation. The vector index and retriever
//! only see the [`EmbeddingProvider`] trait.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};

use crate::progress::ProgressReporter;
use docqa_core::{AppError, AppResult};

/// Embed texts in batches of at most `batch_size`, preserving order.
///
/// Every returned vector is checked against the provider's declared
/// dimensionality.
pub async fn embed_in_batches(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
    batch_size: usize,
    reporter: &ProgressReporter,
) -> AppResult<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    tracing::info!(
        "Embedding {} texts using provider '{}' (model: {})",
        texts.len(),
        provider.provider_name(),
        provider.model_name()
    );

    let total = texts.len() as u64;
    let mut embeddings = Vec::with_capacity(texts.len());

    for batch in texts.chunks(batch_size.max(1)) {
        let vectors = provider.embed_batch(batch).await?;

        if vectors.len() != batch.len() {
            return Err(AppError::Provider(format!(
                "Embedding provider returned {} vectors for {} texts",
                vectors.len(),
                batch.len()
            )));
        }

        if let Some(bad) = vectors.iter().find(|v| v.len() != provider.dimensions()) {
            return Err(AppError::Provider(format!(
                "Embedding provider returned {} dimensions, expected {}",
                bad.len(),
                provider.dimensions()
            )));
        }

        embeddings.extend(vectors);
        reporter.embed(embeddings.len() as u64, Some(total), provider.model_name());
    }

    tracing::debug!(
        "Generated {} embeddings of dimension {}",
        embeddings.len(),
        provider.dimensions()
    );

    Ok(embeddings)
}
