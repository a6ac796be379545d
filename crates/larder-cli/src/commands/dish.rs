//! Dish commands - manage saved dishes
//!
//! Dishes are simpler than ingredients: created once, never edited,
//! removable. Ingredient lines are given on the command line as
//! `name:quantity:unit` triples.

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use larder_core::config::Config;
use larder_core::domain::{Dish, DishIngredient, SyncStatus};
use larder_core::ports::IRecordStore;

use crate::commands::{open_store, sync_after_mutation};
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum DishCommand {
    /// Save a dish with its ingredient lines
    Add {
        /// Dish name
        name: String,
        /// Ingredient lines as name:quantity:unit (repeatable)
        #[arg(short, long = "ingredient")]
        ingredients: Vec<String>,
    },
    /// List saved dishes
    List,
    /// Remove a dish by name
    Remove {
        /// Dish name
        name: String,
    },
}

impl DishCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));
        let config = Config::load_or_default(&Config::default_path());
        let store = open_store(&config).await?;

        match self {
            DishCommand::Add { name, ingredients } => {
                let lines = ingredients
                    .iter()
                    .map(|raw| parse_dish_ingredient(raw))
                    .collect::<Result<Vec<_>>>()?;

                let dish = Dish::new(name, lines);
                store.save_dish(&dish).await.context("Failed to save dish")?;

                formatter.success(&format!(
                    "Saved dish {} with {} ingredient(s)",
                    dish.name(),
                    dish.ingredients().len()
                ));
                sync_after_mutation(&config, store, &*formatter).await;
            }
            DishCommand::List => {
                let dishes = store.fetch_all_dishes().await.context("Failed to list dishes")?;

                if matches!(format, OutputFormat::Json) {
                    let items: Vec<_> = dishes
                        .iter()
                        .map(|dish| {
                            serde_json::json!({
                                "local_id": dish.local_id().to_string(),
                                "name": dish.name(),
                                "ingredients": dish
                                    .ingredients()
                                    .iter()
                                    .map(|line| serde_json::json!({
                                        "name": line.name,
                                        "quantity": line.quantity,
                                        "unit": line.unit,
                                    }))
                                    .collect::<Vec<_>>(),
                                "sync_status": dish.sync_status().as_str(),
                            })
                        })
                        .collect();
                    formatter.print_json(&serde_json::json!({ "dishes": items }));
                    return Ok(());
                }

                if dishes.is_empty() {
                    formatter.info("No dishes saved yet.");
                    return Ok(());
                }

                for dish in &dishes {
                    let marker = if dish.sync_status() == SyncStatus::Synced {
                        ""
                    } else {
                        "*"
                    };
                    formatter.heading(&format!("{}{}", dish.name(), marker));
                    for line in dish.ingredients() {
                        formatter.info(&format!("{} {} {}", line.quantity, line.unit, line.name));
                    }
                }
            }
            DishCommand::Remove { name } => {
                let dishes = store.fetch_all_dishes().await.context("Failed to list dishes")?;
                let lowered = name.to_lowercase();
                let Some(mut dish) =
                    dishes.into_iter().find(|d| d.name().to_lowercase() == lowered)
                else {
                    formatter.error(&format!("No dish named '{}'", name));
                    return Ok(());
                };

                dish.soft_delete();
                store.save_dish(&dish).await.context("Failed to save dish")?;

                formatter.success(&format!("Removed dish {}", dish.name()));
                sync_after_mutation(&config, store, &*formatter).await;
            }
        }

        Ok(())
    }
}

/// Parses one `name:quantity:unit` ingredient line
fn parse_dish_ingredient(raw: &str) -> Result<DishIngredient> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 3 {
        bail!("Invalid ingredient '{}', expected name:quantity:unit", raw);
    }
    let quantity: f64 = parts[1]
        .parse()
        .with_context(|| format!("Invalid quantity in '{}'", raw))?;

    Ok(DishIngredient {
        name: parts[0].to_string(),
        quantity,
        unit: parts[2].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dish_ingredient() {
        let line = parse_dish_ingredient("spaghetti:200:g").unwrap();
        assert_eq!(line.name, "spaghetti");
        assert_eq!(line.quantity, 200.0);
        assert_eq!(line.unit, "g");
    }

    #[test]
    fn test_parse_dish_ingredient_rejects_bad_shapes() {
        assert!(parse_dish_ingredient("spaghetti").is_err());
        assert!(parse_dish_ingredient("spaghetti:lots:g").is_err());
        assert!(parse_dish_ingredient("a:1:g:extra").is_err());
    }
}
