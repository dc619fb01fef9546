//! Source document parsing and per-page text extraction.

use crate::types::PageText;
use docqa_core::{AppError, AppResult};
use std::fs;
use std::path::Path;

/// Page separator for plain-text documents.
const FORM_FEED: char = '\x0c';

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Detect document kind from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "text" | "md" | "markdown" => Some(Self::PlainText),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::PlainText => "text",
        }
    }
}

/// Extract the text of every page in a document.
///
/// Pages keep their position even when they carry no text, so page
/// numbers stay aligned with the rendered page images. A document with no
/// extractable text at all is rejected.
pub fn parse_document(path: &Path) -> AppResult<Vec<PageText>> {
    let kind = DocumentKind::from_path(path).ok_or_else(|| {
        AppError::Ingestion(format!(
            "Unsupported document type: {:?} (expected .pdf, .txt or .md)",
            path
        ))
    })?;

    if !path.is_file() {
        return Err(AppError::Ingestion(format!("Document not found: {:?}", path)));
    }

    let raw_pages = match kind {
        DocumentKind::Pdf => extract_pdf_pages(path)?,
        DocumentKind::PlainText => extract_text_pages(path)?,
    };

    let pages: Vec<PageText> = raw_pages
        .into_iter()
        .enumerate()
        .map(|(i, text)| PageText {
            source_document: path.to_path_buf(),
            page_number: i as u32,
            text,
        })
        .collect();

    if pages.iter().all(|p| p.text.trim().is_empty()) {
        return Err(AppError::Ingestion(format!(
            "No extractable text in {:?}",
            path
        )));
    }

    tracing::debug!(
        "Parsed {:?} as {}: {} pages",
        path,
        kind.as_str(),
        pages.len()
    );

    Ok(pages)
}

fn extract_pdf_pages(path: &Path) -> AppResult<Vec<String>> {
    // pdf-extract panics on some malformed inputs
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text_by_pages(path));

    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(AppError::Ingestion(format!(
            "Failed to extract text from {:?}: {}",
            path, e
        ))),
        Err(_) => Err(AppError::Ingestion(format!(
            "Malformed PDF: {:?}",
            path
        ))),
    }
}

fn extract_text_pages(path: &Path) -> AppResult<Vec<String>> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::Ingestion(format!("Failed to read {:?}: {}", path, e)))?;

    let text = String::from_utf8(bytes)
        .map_err(|_| AppError::Ingestion(format!("{:?} is not valid UTF-8 text", path)))?;

    if text.contains('\0') {
        return Err(AppError::Ingestion(format!(
            "{:?} looks like a binary file",
            path
        )));
    }

    Ok(text.split(FORM_FEED).map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_document_kind_detection() {
        assert_eq!(
            DocumentKind::from_path(Path::new("report.PDF")),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("notes.md")),
            Some(DocumentKind::PlainText)
        );
        assert_eq!(DocumentKind::from_path(Path::new("image.png")), None);
        assert_eq!(DocumentKind::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_text_pages_split_on_form_feed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.txt");
        fs::write(&path, "first page\x0csecond page\x0c\x0cfourth page").unwrap();

        let pages = parse_document(&path).unwrap();
        assert_eq!(pages.len(), 4);
        assert_eq!(pages[1].text, "second page");
        assert_eq!(pages[1].page_number, 1);
        assert_eq!(pages[2].text, "");
        assert_eq!(pages[3].page_number, 3);
        assert_eq!(pages[0].source_document, path);
    }

    #[test]
    fn test_empty_document_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blank.txt");
        fs::write(&path, "  \n\x0c\t").unwrap();

        assert!(matches!(parse_document(&path), Err(AppError::Ingestion(_))));
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("slides.pptx");
        fs::write(&path, "data").unwrap();

        assert!(matches!(parse_document(&path), Err(AppError::Ingestion(_))));
    }

    #[test]
    fn test_missing_file_rejected() {
        let temp = TempDir::new().unwrap();
        let result = parse_document(&temp.path().join("missing.pdf"));
        assert!(matches!(result, Err(AppError::Ingestion(_))));
    }

    #[test]
    fn test_binary_text_file_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.txt");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x41]).unwrap();

        assert!(matches!(parse_document(&path), Err(AppError::Ingestion(_))));
    }

    #[test]
    fn test_malformed_pdf_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.pdf");
        fs::write(&path, b"%PDF-1.4 not really a pdf").unwrap();

        assert!(matches!(parse_document(&path), Err(AppError::Ingestion(_))));
    }

    #[test]
    fn test_pdf_pages_numbered_from_zero() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("three.pdf");
        crate::tests::write_pdf(
            &path,
            &["Alpha page opens.", "Bravo page follows.", "Charlie page ends."],
        );

        let pages = parse_document(&path).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1].page_number, 1);
        assert!(pages[0].text.contains("Alpha"), "{:?}", pages[0].text);
        assert!(pages[1].text.contains("Bravo"), "{:?}", pages[1].text);
        assert!(pages[2].text.contains("Charlie"), "{:?}", pages[2].text);
        assert!(pages.iter().all(|p| p.source_document == path));
    }
}
