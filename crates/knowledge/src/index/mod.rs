//! In-memory vector index over document passages.
//!
//! The index is built in one bulk operation per document and replaced
//! wholesale on the next ingestion. Search is a brute-force cosine scan,
//! which is exact and fast enough for a single document.

mod store;

pub use store::{remove_index, FORMAT_VERSION, MAGIC};

use crate::embeddings::{embed_in_batches, EmbeddingProvider};
use crate::progress::ProgressReporter;
use crate::types::{Passage, ScoredPassage};
use chrono::{DateTime, Utc};
use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Similarity metric used for search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimilarityMetric {
    Cosine,
}

impl SimilarityMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
        }
    }

    fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::Cosine => cosine_similarity(a, b),
        }
    }
}

/// Provenance of the index contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub embedding_provider: String,
    pub embedding_model: String,
    pub source_document: PathBuf,

    /// Hex SHA-256 of the source document bytes
    pub source_sha256: String,

    pub pages_count: u32,
    pub built_at: DateTime<Utc>,
}

impl IndexMetadata {
    pub fn new(
        provider: &dyn EmbeddingProvider,
        source_document: PathBuf,
        source_sha256: String,
        pages_count: u32,
    ) -> Self {
        Self {
            embedding_provider: provider.provider_name().to_string(),
            embedding_model: provider.model_name().to_string(),
            source_document,
            source_sha256,
            pages_count,
            built_at: Utc::now(),
        }
    }
}

/// One stored passage and its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Insertion position, assigned at build time
    pub id: u64,
    pub vector: Vec<f32>,
    pub passage: Passage,
}

/// Searchable store of passage embeddings.
///
/// Every entry's vector has exactly `dimensions` components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorIndex {
    dimensions: usize,
    metric: SimilarityMetric,
    metadata: IndexMetadata,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Embed all passages and build a fresh index.
    pub async fn build(
        passages: Vec<Passage>,
        provider: &dyn EmbeddingProvider,
        batch_size: usize,
        metadata: IndexMetadata,
        reporter: &ProgressReporter,
    ) -> AppResult<Self> {
        let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
        let vectors = embed_in_batches(provider, &texts, batch_size, reporter).await?;

        let index = Self::from_vectors(
            provider.dimensions(),
            vectors.into_iter().zip(passages).collect(),
            metadata,
        )?;

        tracing::info!(
            "Built index: {} passages, {} dimensions",
            index.len(),
            index.dimensions
        );

        Ok(index)
    }

    /// Assemble an index from precomputed vectors.
    pub fn from_vectors(
        dimensions: usize,
        items: Vec<(Vec<f32>, Passage)>,
        metadata: IndexMetadata,
    ) -> AppResult<Self> {
        let entries = items
            .into_iter()
            .enumerate()
            .map(|(i, (vector, passage))| {
                if vector.len() != dimensions {
                    return Err(AppError::DimensionMismatch {
                        expected: dimensions,
                        actual: vector.len(),
                    });
                }
                Ok(IndexEntry {
                    id: i as u64,
                    vector,
                    passage,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            dimensions,
            metric: SimilarityMetric::Cosine,
            metadata,
            entries,
        })
    }

    /// Top-`k` passages by descending similarity to `query`.
    ///
    /// Equal scores keep insertion order. Returns at most
    /// `min(k, self.len())` results.
    pub fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<ScoredPassage>> {
        if query.len() != self.dimensions {
            return Err(AppError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, self.metric.score(query, &entry.vector)))
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| ScoredPassage {
                passage: self.entries[i].passage.clone(),
                score,
            })
            .collect())
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    pub fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cosine similarity; 0.0 when either vector has zero length.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let score = dot_product / (norm_a * norm_b);
    if score.is_finite() {
        score
    } else {
        0.0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::embeddings::providers::MockProvider;

    pub(crate) fn passage(text: &str, page: u32) -> Passage {
        Passage {
            text: text.to_string(),
            source_document: PathBuf::from("doc.pdf"),
            page_number: page,
        }
    }

    pub(crate) fn metadata() -> IndexMetadata {
        IndexMetadata::new(
            &MockProvider::new(4),
            PathBuf::from("doc.pdf"),
            "0".repeat(64),
            1,
        )
    }

    fn normalize(v: &[f32]) -> Vec<f32> {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        v.iter().map(|x| x / norm).collect()
    }

    fn sample_index() -> VectorIndex {
        VectorIndex::from_vectors(
            4,
            vec![
                (normalize(&[1.0, 0.5, 0.2, 0.1]), passage("Rust is a systems language", 0)),
                (normalize(&[-0.3, -0.8, 0.4, -0.2]), passage("Cooking recipes for pasta", 1)),
                (normalize(&[0.8, 0.6, 0.1, 0.0]), passage("Ownership and borrowing", 2)),
                (normalize(&[0.0, 0.0, 1.0, 0.0]), passage("Weather in spring", 3)),
            ],
            metadata(),
        )
        .unwrap()
    }

    #[test]
    fn test_relevant_passage_ranks_first() {
        let index = sample_index();
        let results = index.search(&normalize(&[0.9, 0.4, 0.3, 0.1]), 3).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].passage.text, "Rust is a systems language");
        assert!(results[0].score > 0.9, "score was {}", results[0].score);
    }

    #[test]
    fn test_top_k_bound_and_order() {
        let index = sample_index();
        let query = normalize(&[0.2, 0.1, 0.9, 0.3]);

        for k in 0..6 {
            let results = index.search(&query, k).unwrap();
            assert_eq!(results.len(), k.min(index.len()));
            assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let same = vec![0.0, 1.0, 0.0, 0.0];
        let index = VectorIndex::from_vectors(
            4,
            vec![
                (same.clone(), passage("first", 0)),
                (vec![1.0, 0.0, 0.0, 0.0], passage("other", 0)),
                (same.clone(), passage("second", 1)),
                (same.clone(), passage("third", 2)),
            ],
            metadata(),
        )
        .unwrap();

        let results = index.search(&same, 3).unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.passage.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let index = sample_index();
        let result = index.search(&[1.0, 0.0], 3);

        assert!(matches!(
            result,
            Err(AppError::DimensionMismatch {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_entry_dimension_mismatch_rejected() {
        let result = VectorIndex::from_vectors(
            4,
            vec![(vec![1.0, 0.0, 0.0], passage("short", 0))],
            metadata(),
        );
        assert!(matches!(result, Err(AppError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_search_empty_index() {
        let index = VectorIndex::from_vectors(4, vec![], metadata()).unwrap();
        assert!(index.is_empty());
        assert!(index.search(&[1.0, 0.0, 0.0, 0.0], 3).unwrap().is_empty());
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_build_assigns_sequential_ids() {
        let provider = MockProvider::new(32);
        let passages = vec![passage("alpha beta gamma", 0), passage("delta epsilon", 1)];

        let index = VectorIndex::build(passages, &provider, 1, metadata(), &ProgressReporter::noop())
            .await
            .unwrap();

        assert_eq!(index.dimensions(), 32);
        let ids: Vec<u64> = index.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(index.entries()[1].passage.page_number, 1);
    }
}
