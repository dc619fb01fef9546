//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Text extracted from one page of a source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// Document the page belongs to
    pub source_document: PathBuf,

    /// 0-indexed page number
    pub page_number: u32,

    /// Extracted text, verbatim
    pub text: String,
}

/// A chunk of document text with its provenance.
///
/// Created by the chunker and never modified afterwards; retrieval hands
/// back exactly what was indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Chunk text
    pub text: String,

    /// Document the chunk was cut from
    pub source_document: PathBuf,

    /// 0-indexed page of the chunk's first character
    pub page_number: u32,
}

impl Passage {
    /// 1-indexed page number for display.
    pub fn display_page(&self) -> u32 {
        self.page_number + 1
    }
}

/// A retrieved passage with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub passage: Passage,

    /// Cosine similarity in [-1.0, 1.0]
    pub score: f32,
}

/// Provenance of a passage used to answer a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    #[serde(rename = "passageText")]
    pub passage_text: String,

    #[serde(rename = "sourceDocument")]
    pub source_document: PathBuf,

    /// 0-indexed page number
    #[serde(rename = "pageNumber")]
    pub page_number: u32,

    pub score: f32,

    /// Rendered page image, when the page renderer has produced one
    #[serde(rename = "pageImage", skip_serializing_if = "Option::is_none")]
    pub page_image: Option<PathBuf>,
}

impl Citation {
    /// 1-indexed page number for display.
    pub fn display_page(&self) -> u32 {
        self.page_number + 1
    }
}

/// Answer to a question together with the passages it was conditioned on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
    pub citations: Vec<Citation>,
}

/// Statistics from one ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestStats {
    #[serde(rename = "sourceDocument")]
    pub source_document: PathBuf,

    #[serde(rename = "pagesCount")]
    pub pages_count: u32,

    #[serde(rename = "passagesCount")]
    pub passages_count: u32,

    pub dimensions: usize,

    #[serde(rename = "bytesProcessed")]
    pub bytes_processed: u64,

    #[serde(rename = "durationSecs")]
    pub duration_secs: f64,
}

/// Description of the currently persisted index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    #[serde(rename = "sourceDocument")]
    pub source_document: PathBuf,

    #[serde(rename = "passagesCount")]
    pub passages_count: u32,

    #[serde(rename = "pagesCount")]
    pub pages_count: u32,

    pub dimensions: usize,

    pub metric: String,

    #[serde(rename = "embeddingProvider")]
    pub embedding_provider: String,

    #[serde(rename = "embeddingModel")]
    pub embedding_model: String,

    #[serde(rename = "builtAt")]
    pub built_at: DateTime<Utc>,

    #[serde(rename = "indexSizeBytes")]
    pub index_size_bytes: u64,
}
