//! Add command - create an ingredient locally, then sync
//!
//! The record is saved as pending before any network activity, so the
//! command succeeds offline; the post-mutation pass pushes it when the
//! server is reachable.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;

use larder_core::config::Config;
use larder_core::domain::{Ingredient, StorageType};
use larder_core::ports::IRecordStore;

use crate::commands::{open_store, sync_after_mutation};
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct AddCommand {
    /// Ingredient name
    pub name: String,

    /// Quantity on hand
    #[arg(short, long, default_value_t = 1.0)]
    pub quantity: f64,

    /// Unit of measure (pcs, g, L, ...)
    #[arg(short, long, default_value = "pcs")]
    pub unit: String,

    /// Where it is stored: frozen, chilled, or pantry
    #[arg(short, long, default_value = "pantry")]
    pub storage: String,

    /// Expiration date (YYYY-MM-DD); defaults from the storage type
    #[arg(short, long)]
    pub expires: Option<String>,
}

impl AddCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));

        let storage_type: StorageType = self
            .storage
            .parse()
            .with_context(|| format!("Unknown storage type '{}'", self.storage))?;

        let mut record = Ingredient::new(&self.name, self.quantity, &self.unit, storage_type);
        if let Some(ref date) = self.expires {
            record.set_expiration_date(Some(parse_expiration(date)?));
        }

        let config = Config::load_or_default(&Config::default_path());
        let store = open_store(&config).await?;
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
                "storage_type": record.storage_type().as_str(),
                "expiration_date": record.expiration_date().map(|d| d.to_rfc3339()),
            }));
        } else {
            formatter.success(&format!(
                "Added {} {} {} ({})",
                record.quantity(),
                record.unit(),
                record.name(),
                record.storage_type()
            ));
        }

        sync_after_mutation(&config, store, &*formatter).await;
        Ok(())
    }
}

/// Parses `YYYY-MM-DD` into an end-of-day UTC timestamp
pub(crate) fn parse_expiration(date: &str) -> Result<DateTime<Utc>> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", date))?;
    let at_end_of_day = day
        .and_hms_opt(23, 59, 59)
        .context("Invalid time of day")?;
    Ok(DateTime::from_naive_utc_and_offset(at_end_of_day, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_expiration_valid() {
        let parsed = parse_expiration("2026-09-15").unwrap();
        assert_eq!(parsed.year(), 2026);
        assert_eq!(parsed.month(), 9);
        assert_eq!(parsed.day(), 15);
    }

    #[test]
    fn test_parse_expiration_rejects_garbage() {
        assert!(parse_expiration("next tuesday").is_err());
        assert!(parse_expiration("2026-13-01").is_err());
    }
}
