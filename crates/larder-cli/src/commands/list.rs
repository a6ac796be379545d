//! List command - show the local inventory
//!
//! Reads only from the record store; tombstones are already filtered
//! out by the repository query. Each row carries a one-character sync
//! marker so pending and failed records stand out.

use anyhow::{Context, Result};
use clap::Args;

use larder_core::config::Config;
use larder_core::domain::{Ingredient, SyncStatus};
use larder_core::ports::IRecordStore;

use crate::commands::open_store;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only show records not yet confirmed by the server
    #[arg(long)]
    pub pending: bool,
}

impl ListCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));

        let config = Config::load_or_default(&Config::default_path());
        let store = open_store(&config).await?;

        let mut records = store
            .fetch_all_ingredients()
            .await
            .context("Failed to list ingredients")?;

        if self.pending {
            records.retain(|r| r.sync_status() != SyncStatus::Synced);
        }

        if matches!(format, OutputFormat::Json) {
            let items: Vec<_> = records.iter().map(record_to_json).collect();
            formatter.print_json(&serde_json::json!({ "ingredients": items }));
            return Ok(());
        }

        if records.is_empty() {
            formatter.info("No ingredients. Add one with 'larder add <name>'.");
            return Ok(());
        }

        formatter.heading(&format!(
            "{:<2} {:<24} {:>8} {:<6} {:<8} {:<12}",
            "", "NAME", "QTY", "UNIT", "STORAGE", "EXPIRES"
        ));
        for record in &records {
            let expires = record
                .expiration_date()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string());
            formatter.heading(&format!(
                "{:<2} {:<24} {:>8} {:<6} {:<8} {:<12}",
                sync_marker(record),
                record.name(),
                record.quantity(),
                record.unit(),
                record.storage_type(),
                expires
            ));
        }

        let pending = records
            .iter()
            .filter(|r| r.sync_status() == SyncStatus::Pending)
            .count();
        if pending > 0 {
            formatter.info(&format!("{} record(s) waiting to sync", pending));
        }

        Ok(())
    }
}

/// `*` pending, `!` failed, blank when synced
fn sync_marker(record: &Ingredient) -> &'static str {
    match record.sync_status() {
        SyncStatus::Pending => "*",
        SyncStatus::Failed => "!",
        SyncStatus::Synced => "",
    }
}

fn record_to_json(record: &Ingredient) -> serde_json::Value {
    serde_json::json!({
        "local_id": record.local_id().to_string(),
        "server_id": record.server_id().map(|s| s.to_string()),
        "name": record.name(),
        "quantity": record.quantity(),
        "unit": record.unit(),
        "storage_type": record.storage_type().as_str(),
        "expiration_date": record.expiration_date().map(|d| d.to_rfc3339()),
        "sync_status": record.sync_status().as_str(),
        "last_error": record.last_error(),
    })
}
