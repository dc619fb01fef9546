//! Mapping from passage provenance to rendered page images.
//!
//! Page images come from an external renderer. They live either in a
//! per-document subdirectory of the pages directory (named after the
//! document's file stem) or directly in the pages directory. Images are
//! ordered naturally by file name, so `page_2.png` sorts before
//! `page_10.png`, and the image at position `n` (1-indexed) shows page
//! `n`. A passage with 0-indexed `page_number` therefore maps to
//! position `page_number + 1`.

use crate::types::{Citation, ScoredPassage};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Resolves passages to page images under a pages directory.
#[derive(Debug, Clone)]
pub struct CitationResolver {
    pages_dir: PathBuf,
}

impl CitationResolver {
    pub fn new(pages_dir: impl Into<PathBuf>) -> Self {
        Self {
            pages_dir: pages_dir.into(),
        }
    }

    /// Image for the 0-indexed `page_number` of `source_document`, if the
    /// renderer produced one.
    pub fn resolve(&self, source_document: &Path, page_number: u32) -> Option<PathBuf> {
        let images = self.page_images(source_document);
        images.into_iter().nth(page_number as usize)
    }

    /// Build citations for retrieved passages, preserving their order.
    pub fn citations(&self, passages: &[ScoredPassage]) -> Vec<Citation> {
        passages
            .iter()
            .map(|scored| {
                let passage = &scored.passage;
                let page_image = self.resolve(&passage.source_document, passage.page_number);

                if page_image.is_none() {
                    tracing::debug!(
                        "No page image for page {} of {:?}",
                        passage.display_page(),
                        passage.source_document
                    );
                }

                Citation {
                    passage_text: passage.text.clone(),
                    source_document: passage.source_document.clone(),
                    page_number: passage.page_number,
                    score: scored.score,
                    page_image,
                }
            })
            .collect()
    }

    /// Naturally sorted page images for `source_document`.
    pub fn page_images(&self, source_document: &Path) -> Vec<PathBuf> {
        let per_document = source_document
            .file_stem()
            .map(|stem| self.pages_dir.join(stem))
            .filter(|dir| dir.is_dir());

        list_images(per_document.as_deref().unwrap_or(&self.pages_dir))
    }
}

fn list_images(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut images: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect();

    images.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
    images
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Compare strings treating runs of ASCII digits as numbers.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a_chars = a.chars().peekable();
    let mut b_chars = b.chars().peekable();

    loop {
        match (a_chars.peek().copied(), b_chars.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let left = take_number(&mut a_chars);
                let right = take_number(&mut b_chars);

                let ordering = compare_digits(&left, &right);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(x), Some(y)) => {
                let ordering = x.cmp(&y);
                if ordering != Ordering::Equal {
                    return ordering;
                }
                a_chars.next();
                b_chars.next();
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    digits
}

/// Numeric comparison of digit strings of any length.
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
