//! Recursive-boundary chunking of page text into overlapping passages.
//!
//! Each page is split on its own, so a passage never spans two pages and
//! its page number is exact. Within a page:
//! - every chunk has at most `chunk_size` characters
//! - a chunk ends at the latest paragraph boundary that fits, else the
//!   latest sentence boundary, else the latest word boundary, else it is
//!   cut hard at `chunk_size`
//! - the next chunk starts `chunk_overlap` characters before the previous
//!   one ended, so the two share exactly that many characters
//!
//! Dropping the first `chunk_overlap` characters of every chunk after the
//! first and concatenating reconstructs the page text exactly.

mod boundaries;

use crate::config::RagSettings;
use crate::types::{PageText, Passage};
use boundaries::Boundaries;
use docqa_core::AppResult;

/// Splits page text into passages.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    pub fn new(settings: &RagSettings) -> AppResult<Self> {
        settings.validate()?;
        Ok(Self {
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
        })
    }

    /// Chunk every page, in page order.
    ///
    /// Whitespace-only pages produce no passages.
    pub fn chunk(&self, pages: &[PageText]) -> Vec<Passage> {
        let passages: Vec<Passage> = pages
            .iter()
            .flat_map(|page| {
                self.split(&page.text).into_iter().map(|text| Passage {
                    text,
                    source_document: page.source_document.clone(),
                    page_number: page.page_number,
                })
            })
            .collect();

        tracing::debug!(
            "Chunked {} pages into {} passages (size={}, overlap={})",
            pages.len(),
            passages.len(),
            self.chunk_size,
            self.chunk_overlap
        );

        passages
    }

    /// Split one region of text into overlapping chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        if chars.len() <= self.chunk_size {
            return vec![text.to_string()];
        }

        let boundaries = Boundaries::analyze(text, &chars);
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            if chars.len() - start <= self.chunk_size {
                chunks.push(chars[start..].iter().collect());
                break;
            }

            let end = boundaries.cut_point(start + self.chunk_overlap, start + self.chunk_size);
            chunks.push(chars[start..end].iter().collect());
            start = end - self.chunk_overlap;
        }

        chunks
    }
}
