//! Ingest command handler.
//!
//! Parses, chunks and embeds a document, replacing the current index.

use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{ProgressEvent, ProgressReporter, RagSettings, StoragePaths};
use std::path::PathBuf;
use std::sync::Arc;

/// Ingest a document (PDF, .txt or .md)
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Document to ingest
    pub file: PathBuf,

    /// Copy the document into the workspace uploads directory first
    #[arg(long)]
    pub copy: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command for {:?}", self.file);

        config.validate()?;

        let paths = StoragePaths::from_config(config);
        let settings = RagSettings::default();
        let (provider, batch_size) = super::embedding_provider(config)?;

        let reporter = if self.json {
            ProgressReporter::noop()
        } else {
            ProgressReporter::new(Arc::new(|event: ProgressEvent| {
                eprintln!("{}", event.format_simple())
            }))
        };

        let stats = if self.copy {
            let bytes = std::fs::read(&self.file).map_err(|e| {
                docqa_core::AppError::Ingestion(format!("Failed to read {:?}: {}", self.file, e))
            })?;
            let file_name = self
                .file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            docqa_knowledge::upload(
                &file_name,
                &bytes,
                &paths,
                &settings,
                provider.as_ref(),
                batch_size,
                &reporter,
            )
            .await?
        } else {
            docqa_knowledge::ingest(
                &self.file,
                &paths,
                &settings,
                provider.as_ref(),
                batch_size,
                &reporter,
            )
            .await?
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!(
                "Ingested {:?}: {} pages, {} passages ({} bytes) in {:.2}s",
                stats.source_document,
                stats.pages_count,
                stats.passages_count,
                stats.bytes_processed,
                stats.duration_secs
            );
        }

        Ok(())
    }
}
