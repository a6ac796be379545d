//! Remove command - soft-delete an ingredient
//!
//! The record becomes a tombstone: hidden from listings immediately,
//! hard-deleted only once the server confirms the delete (or right
//! away when the server never knew about it).

use anyhow::{Context, Result};
use clap::Args;

use larder_core::config::Config;
use larder_core::ports::IRecordStore;

use crate::commands::{find_ingredient, open_store, sync_after_mutation};
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct RemoveCommand {
    /// Ingredient to remove, by name or local id
    pub ingredient: String,
}

impl RemoveCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));

        let config = Config::load_or_default(&Config::default_path());
        let store = open_store(&config).await?;

        let Some(mut record) = find_ingredient(&store, &self.ingredient).await? else {
            formatter.error(&format!("No ingredient named '{}'", self.ingredient));
            return Ok(());
        };

        record.soft_delete();
        store
            .save_ingredient(&record)
            .await
            .context("Failed to save ingredient")?;

        formatter.success(&format!("Removed {}", record.name()));

        sync_after_mutation(&config, store, &*formatter).await;
        Ok(())
    }
}
