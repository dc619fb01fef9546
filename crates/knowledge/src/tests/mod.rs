//! End-to-end tests for ingestion and question answering.


use crate::config::{RagSettings, StoragePaths};
use crate::embeddings::providers::MockProvider;
use crate::progress::ProgressReporter;
use crate::rag::synthesizer::tests::StubClient;
use crate::rag::{AnswerSynthesizer, Retriever};
use crate::types::IngestStats;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub(crate) const DIMENSIONS: usize = 256;

/// Temporary workspace with the standard state layout.
pub(crate) struct Workspace {
    pub temp: TempDir,
    pub paths: StoragePaths,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let paths = StoragePaths::under(&temp.path().join(".docqa"));
        Self { temp, paths }
    }

    /// Write a plain-text document whose pages are separated by form feeds.
    pub fn document(&self, name: &str, pages: &[&str]) -> PathBuf {
        let path = self.temp.path().join(name);
        fs::write(&path, pages.join("\x0c")).unwrap();
        path
    }

    /// Write a PDF with one line of Helvetica text per page.
    pub fn pdf(&self, name: &str, pages: &[&str]) -> PathBuf {
        let path = self.temp.path().join(name);
        write_pdf(&path, pages);
        path
    }

    /// Drop placeholder page images `page_1.png..page_N.png` into `pages/`.
    pub fn render_pages(&self, count: usize) {
        fs::create_dir_all(&self.paths.pages_dir).unwrap();
        for page in 1..=count {
            fs::write(self.paths.pages_dir.join(format!("page_{}.png", page)), b"png").unwrap();
        }
    }

    pub async fn ingest(&self, document: &Path) -> IngestStats {
        crate::ingest(
            document,
            &self.paths,
            &RagSettings::default(),
            &MockProvider::new(DIMENSIONS),
            8,
            &ProgressReporter::noop(),
        )
        .await
        .unwrap()
    }

    pub fn retriever(&self) -> Retriever {
        Retriever::new(Arc::new(MockProvider::new(DIMENSIONS)), &RagSettings::default())
    }

    pub fn synthesizer(&self) -> (AnswerSynthesizer, Arc<StubClient>) {
        let client = Arc::new(StubClient::default());
        let synth =
            AnswerSynthesizer::new(client.clone(), "llama3.2", &self.paths.prompts_dir).unwrap();
        (synth, client)
    }
}

pub(crate) const GEOGRAPHY: [&str; 3] = [
    "Bananas are a yellow fruit grown in tropical regions around the equator.",
    "The capital of France is Paris. The city sits on the river Seine.",
    "Photosynthesis converts sunlight, water and carbon dioxide into sugar.",
];

pub(crate) fn write_pdf(path: &Path, pages: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}
