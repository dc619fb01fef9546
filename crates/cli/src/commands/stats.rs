//! Stats command handler.
//!
//! Describes the persisted index.

use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{RagSettings, StoragePaths};

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let paths = StoragePaths::from_config(config);
        let stats = docqa_knowledge::stats(&paths)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!("Document: {}", stats.source_document.display());
            println!("  Pages: {}", stats.pages_count);
            println!("  Passages: {}", stats.passages_count);
            println!(
                "  Embeddings: {}/{} ({} dimensions, {})",
                stats.embedding_provider, stats.embedding_model, stats.dimensions, stats.metric
            );
            println!("  Index size: {} bytes", stats.index_size_bytes);
            println!("  Built at: {}", stats.built_at.to_rfc3339());
            println!(
                "  Page images: {} (expected at {} DPI)",
                paths.pages_dir.display(),
                RagSettings::default().page_dpi
            );
        }

        Ok(())
    }
}
