//! Clean command handler.

use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::StoragePaths;

/// Delete the persisted index
#[derive(Args, Debug)]
pub struct CleanCommand {}

impl CleanCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing clean command");

        if docqa_knowledge::clean(&StoragePaths::from_config(config))? {
            println!("Index removed");
        } else {
            println!("No index to remove");
        }

        Ok(())
    }
}
