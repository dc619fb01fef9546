//! Question-to-passages retrieval.

use crate::config::RagSettings;
use crate::embeddings::EmbeddingProvider;
use crate::index::VectorIndex;
use crate::types::ScoredPassage;
use docqa_core::AppResult;
use std::sync::Arc;

/// Embeds a question and returns the `top_k` most similar passages.
#[derive(Debug)]
pub struct Retriever {
    provider: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, settings: &RagSettings) -> Self {
        Self {
            provider,
            top_k: settings.top_k,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn provider(&self) -> &dyn EmbeddingProvider {
        self.provider.as_ref()
    }

    /// Retrieve passages for `question`, best match first.
    ///
    /// Returns `min(top_k, index.len())` passages. An empty question is
    /// embedded like any other text.
    pub async fn retrieve(
        &self,
        index: &VectorIndex,
        question: &str,
    ) -> AppResult<Vec<ScoredPassage>> {
        let query = self.provider.embed(question).await?;

        let results = index.search(&query, self.top_k)?;

        if let Some(best) = results.first() {
            tracing::info!(
                "Retrieved {} passages (top score: {:.3}, lowest: {:.3})",
                results.len(),
                best.score,
                results.last().map(|r| r.score).unwrap_or(best.score)
            );
        } else {
            tracing::info!("Index is empty; no passages retrieved");
        }

        Ok(results)
    }
}
