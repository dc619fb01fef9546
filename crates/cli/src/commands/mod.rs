//! Command handlers for the docqa CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod clean;
pub mod ingest;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use clean::CleanCommand;
pub use ingest::IngestCommand;
pub use stats::StatsCommand;

use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{create_provider, EmbeddingConfig, EmbeddingProvider};
use std::sync::Arc;

/// Embedding provider configured for this workspace, with its batch size.
pub(crate) fn embedding_provider(
    config: &AppConfig,
) -> AppResult<(Arc<dyn EmbeddingProvider>, usize)> {
    let embedding_config = EmbeddingConfig::from_app_config(config);
    let provider = create_provider(&embedding_config)?;

    tracing::debug!(
        "Embedding with {}/{} ({} dimensions)",
        provider.provider_name(),
        provider.model_name(),
        provider.dimensions()
    );

    Ok((provider, embedding_config.batch_size))
}
