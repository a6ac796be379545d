//! Edit command - modify an ingredient in place
//!
//! Every change goes through the entity's setters, so the record is
//! re-marked pending and picked up by the next sync pass. Editing the
//! quantity down to zero (or below) consumes the ingredient: it is
//! soft-deleted rather than kept as an empty row.

use anyhow::{Context, Result};
use clap::Args;

use larder_core::config::Config;
use larder_core::domain::StorageType;
use larder_core::ports::IRecordStore;

use crate::commands::add::parse_expiration;
use crate::commands::{find_ingredient, open_store, sync_after_mutation};
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct EditCommand {
    /// Ingredient to edit, by name or local id
    pub ingredient: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New quantity; zero or below removes the ingredient
    #[arg(short, long)]
    pub quantity: Option<f64>,

    /// New unit of measure
    #[arg(short, long)]
    pub unit: Option<String>,

    /// New storage type: frozen, chilled, or pantry
    #[arg(short, long)]
    pub storage: Option<String>,

    /// New expiration date (YYYY-MM-DD)
    #[arg(short, long)]
    pub expires: Option<String>,
}

impl EditCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));

        let config = Config::load_or_default(&Config::default_path());
        let store = open_store(&config).await?;

        let Some(mut record) = find_ingredient(&store, &self.ingredient).await? else {
            formatter.error(&format!("No ingredient named '{}'", self.ingredient));
            return Ok(());
        };

        // Consumption rule: a zero quantity means the ingredient is gone
        if let Some(quantity) = self.quantity {
            if quantity <= 0.0 {
                record.soft_delete();
                store
                    .save_ingredient(&record)
                    .await
                    .context("Failed to save ingredient")?;
                formatter.success(&format!("{} used up, removed from the larder", record.name()));
                sync_after_mutation(&config, store, &*formatter).await;
                return Ok(());
            }
            record.set_quantity(quantity);
        }

        if let Some(ref name) = self.name {
            record.set_name(name);
        }
        if let Some(ref unit) = self.unit {
            record.set_unit(unit);
        }
        if let Some(ref storage) = self.storage {
            let storage_type: StorageType = storage
                .parse()
                .with_context(|| format!("Unknown storage type '{}'", storage))?;
            record.set_storage_type(storage_type);
        }
        if let Some(ref date) = self.expires {
            record.set_expiration_date(Some(parse_expiration(date)?));
        }

        store
            .save_ingredient(&record)
            .await
            .context("Failed to save ingredient")?;

        if matches!(format, OutputFormat::Json) {
            formatter.print_json(&serde_json::json!({
                "local_id": record.local_id().to_string(),
                "name": record.name(),
                "quantity": record.quantity(),
                "unit": record.unit(),
            }));
        } else {
            formatter.success(&format!(
                "Updated {} ({} {})",
                record.name(),
                record.quantity(),
                record.unit()
            ));
        }

        sync_after_mutation(&config, store, &*formatter).await;
        Ok(())
    }
}
