//! Status command - show session, record counts, and problem records
//!
//! Reads only local state: the persisted session and the record store.
//! Failed records are listed with the server's rejection reason so the
//! user knows what to fix.

use anyhow::{Context, Result};
use clap::Args;

use larder_core::config::Config;
use larder_core::domain::{Ingredient, SyncStatus};
use larder_core::ports::IRecordStore;

use crate::commands::{load_session, open_store};
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct StatusCommand {}

impl StatusCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));

        let config = Config::load_or_default(&Config::default_path());
        let session = load_session();

        if !config.storage.database.exists() {
            formatter.info("No local database yet. Add an ingredient to create one.");
            return Ok(());
        }

        let store = open_store(&config).await?;
        let records = store
            .fetch_all_ingredients()
            .await
            .context("Failed to query ingredients")?;
        let queue = store
            .fetch_ingredients_for_sync()
            .await
            .context("Failed to query sync queue")?;
        let dishes = store.fetch_all_dishes().await.context("Failed to query dishes")?;

        let synced = count_by_status(&records, SyncStatus::Synced);
        let pending = count_by_status(&records, SyncStatus::Pending);
        let failed: Vec<&Ingredient> = records
            .iter()
            .filter(|r| r.sync_status() == SyncStatus::Failed)
            .collect();
        // Tombstones are hidden from listings but still occupy the queue
        let tombstones = queue.iter().filter(|r| r.is_deleted()).count();

        if matches!(format, OutputFormat::Json) {
            formatter.print_json(&serde_json::json!({
                "logged_in": session.is_some(),
                "email": session.as_ref().map(|s| s.email.clone()),
                "family_id": session.as_ref().map(|s| s.family_id.to_string()),
                "ingredients": records.len(),
                "dishes": dishes.len(),
                "synced": synced,
                "pending": pending,
                "failed": failed.len(),
                "pending_deletes": tombstones,
                "failed_records": failed
                    .iter()
                    .map(|r| serde_json::json!({
                        "name": r.name(),
                        "reason": r.last_error(),
                    }))
                    .collect::<Vec<_>>(),
            }));
            return Ok(());
        }

        match &session {
            Some(s) => formatter.success(&format!("Logged in as {} (family {})", s.email, s.family_id)),
            None => formatter.warn("Not logged in; records stay on this device."),
        }

        formatter.info("");
        formatter.info(&format!("Ingredients: {}", records.len()));
        formatter.info(&format!("Dishes:      {}", dishes.len()));
        formatter.info(&format!("Synced:      {}", synced));
        if pending > 0 {
            formatter.info(&format!("Pending:     {}", pending));
        }
        if tombstones > 0 {
            formatter.info(&format!("Deletes waiting for the server: {}", tombstones));
        }

        if !failed.is_empty() {
            formatter.info("");
            formatter.warn(&format!("{} record(s) rejected by the server:", failed.len()));
            for record in &failed {
                let reason = record.last_error().unwrap_or("unknown reason");
                formatter.info(&format!("{} - {}", record.name(), reason));
            }
            formatter.info("Edit a rejected record to retry it.");
        }

        Ok(())
    }
}

fn count_by_status(records: &[Ingredient], status: SyncStatus) -> usize {
    records.iter().filter(|r| r.sync_status() == status).count()
}
