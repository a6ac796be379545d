//! SQLite implementation of IRecordStore
//!
//! This module provides the concrete SQLite-based implementation of the
//! record store port defined in larder-core. It handles all domain
//! type serialization/deserialization and SQL query construction.
//!
//! ## Type Mapping
//!
//! | Domain Type      | SQL Type | Strategy                                   |
//! |------------------|----------|--------------------------------------------|
//! | LocalId          | TEXT     | UUID string via `.to_string()` / `FromStr` |
//! | ServerId         | TEXT     | String via `.as_str()` / `ServerId::new()` |
//! | SyncStatus       | TEXT     | `.as_str()` / `FromStr`                    |
//! | StorageType      | TEXT     | `.as_str()` / `FromStr`                    |
//! | DateTime<Utc>    | TEXT     | ISO 8601 via `to_rfc3339()`                |
//! | Vec<DishIngredient> | TEXT  | serde_json array                           |
//! | deleted flag     | INTEGER  | 0 / 1                                      |

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use larder_core::domain::{Dish, Ingredient, LocalId, ServerId};
use larder_core::ports::IRecordStore;

use crate::StoreError;

/// SQLite-based implementation of the record store port
///
/// Provides persistent storage for ingredient and dish records.
/// All operations are performed through a connection pool for concurrency.
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Creates a new store instance with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Helper functions for type conversion
// ============================================================================

/// Parse a DateTime<Utc> from an ISO 8601 string
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            StoreError::SerializationError(format!("Failed to parse datetime '{}': {}", s, e))
        })
}

/// Parse an optional DateTime<Utc> from an optional string
fn parse_optional_datetime(s: Option<String>) -> Result<Option<DateTime<Utc>>, StoreError> {
    match s {
        Some(ref val) if !val.is_empty() => parse_datetime(val).map(Some),
        _ => Ok(None),
    }
}

fn optional_string_value(s: &Option<String>) -> serde_json::Value {
    match s {
        Some(v) => serde_json::Value::String(v.clone()),
        None => serde_json::Value::Null,
    }
}

// ============================================================================
// Row mapping functions
// ============================================================================

/// Reconstruct an Ingredient from a database row
///
/// Uses serde JSON deserialization to reconstruct the entity since it
/// has private fields that can only be set through constructors or
/// deserialization.
fn ingredient_from_row(row: &SqliteRow) -> Result<Ingredient, StoreError> {
    let local_id: String = row.get("local_id");
    let server_id: Option<String> = row.get("server_id");
    let name: String = row.get("name");
    let quantity: f64 = row.get("quantity");
    let unit: String = row.get("unit");
    let storage_type: String = row.get("storage_type");
    let expiration_date: Option<String> = row.get("expiration_date");
    let created_at: String = row.get("created_at");
    let image_url: Option<String> = row.get("image_url");
    let sync_status: String = row.get("sync_status");
    let updated_at: String = row.get("updated_at");
    let deleted: i64 = row.get("deleted");
    let last_error: Option<String> = row.get("last_error");

    let expiration_val = match parse_optional_datetime(expiration_date)? {
        Some(dt) => serde_json::Value::String(dt.to_rfc3339()),
        None => serde_json::Value::Null,
    };

    let ingredient_json = serde_json::json!({
        "local_id": local_id,
        "server_id": optional_string_value(&server_id),
        "name": name,
        "quantity": quantity,
        "unit": unit,
        "storage_type": storage_type,
        "expiration_date": expiration_val,
        "created_at": parse_datetime(&created_at)?.to_rfc3339(),
        "image_url": optional_string_value(&image_url),
        "sync_status": sync_status,
        "updated_at": parse_datetime(&updated_at)?.to_rfc3339(),
        "deleted": deleted != 0,
        "last_error": optional_string_value(&last_error),
    });

    serde_json::from_value(ingredient_json).map_err(|e| {
        StoreError::SerializationError(format!("Failed to reconstruct ingredient: {}", e))
    })
}

/// Reconstruct a Dish from a database row
fn dish_from_row(row: &SqliteRow) -> Result<Dish, StoreError> {
    let local_id: String = row.get("local_id");
    let server_id: Option<String> = row.get("server_id");
    let name: String = row.get("name");
    let ingredients: String = row.get("ingredients");
    let created_at: String = row.get("created_at");
    let sync_status: String = row.get("sync_status");
    let updated_at: String = row.get("updated_at");
    let deleted: i64 = row.get("deleted");

    let ingredients_val: serde_json::Value = serde_json::from_str(&ingredients)
        .map_err(|e| StoreError::SerializationError(format!("Invalid ingredients JSON: {}", e)))?;

    let dish_json = serde_json::json!({
        "local_id": local_id,
        "server_id": optional_string_value(&server_id),
        "name": name,
        "ingredients": ingredients_val,
        "created_at": parse_datetime(&created_at)?.to_rfc3339(),
        "sync_status": sync_status,
        "updated_at": parse_datetime(&updated_at)?.to_rfc3339(),
        "deleted": deleted != 0,
    });

    serde_json::from_value(dish_json)
        .map_err(|e| StoreError::SerializationError(format!("Failed to reconstruct dish: {}", e)))
}

// ============================================================================
// IRecordStore implementation
// ============================================================================

#[async_trait::async_trait]
impl IRecordStore for SqliteRecordStore {
    // --- Ingredient operations ---

    async fn save_ingredient(&self, ingredient: &Ingredient) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO ingredients (
                local_id, server_id, name, quantity, unit, storage_type,
                expiration_date, created_at, image_url, sync_status,
                updated_at, deleted, last_error
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(ingredient.local_id().to_string())
        .bind(ingredient.server_id().map(|id| id.as_str().to_string()))
        .bind(ingredient.name())
        .bind(ingredient.quantity())
        .bind(ingredient.unit())
        .bind(ingredient.storage_type().as_str())
        .bind(ingredient.expiration_date().map(|dt| dt.to_rfc3339()))
        .bind(ingredient.created_at().to_rfc3339())
        .bind(ingredient.image_url().map(|u| u.to_string()))
        .bind(ingredient.sync_status().as_str())
        .bind(ingredient.updated_at().to_rfc3339())
        .bind(ingredient.is_deleted() as i64)
        .bind(ingredient.last_error().map(|e| e.to_string()))
        .execute(&self.pool)
        .await?;

        tracing::debug!(local_id = %ingredient.local_id(), "Ingredient saved");
        Ok(())
    }

    async fn get_ingredient(&self, local_id: &LocalId) -> anyhow::Result<Option<Ingredient>> {
        let row = sqlx::query("SELECT * FROM ingredients WHERE local_id = ?")
            .bind(local_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(ingredient_from_row).transpose().map_err(Into::into)
    }

    async fn get_ingredient_by_server_id(
        &self,
        server_id: &ServerId,
    ) -> anyhow::Result<Option<Ingredient>> {
        let row = sqlx::query("SELECT * FROM ingredients WHERE server_id = ?")
            .bind(server_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(ingredient_from_row).transpose().map_err(Into::into)
    }

    async fn fetch_all_ingredients(&self) -> anyhow::Result<Vec<Ingredient>> {
        let rows =
            sqlx::query("SELECT * FROM ingredients WHERE deleted = 0 ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        rows.iter()
            .map(ingredient_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    async fn fetch_ingredients_for_sync(&self) -> anyhow::Result<Vec<Ingredient>> {
        // Failed records are parked until a user edit marks them pending
        // again, so the work queue is pending rows only.
        let rows = sqlx::query(
            "SELECT * FROM ingredients WHERE sync_status = 'pending' ORDER BY updated_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(ingredient_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    async fn update_ingredient_after_sync(
        &self,
        ingredient: &Ingredient,
        expected_updated_at: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE ingredients SET
                server_id = ?, name = ?, quantity = ?, unit = ?,
                storage_type = ?, expiration_date = ?, image_url = ?,
                sync_status = ?, updated_at = ?, deleted = ?, last_error = ?
            WHERE local_id = ? AND updated_at = ?
            "#,
        )
        .bind(ingredient.server_id().map(|id| id.as_str().to_string()))
        .bind(ingredient.name())
        .bind(ingredient.quantity())
        .bind(ingredient.unit())
        .bind(ingredient.storage_type().as_str())
        .bind(ingredient.expiration_date().map(|dt| dt.to_rfc3339()))
        .bind(ingredient.image_url().map(|u| u.to_string()))
        .bind(ingredient.sync_status().as_str())
        .bind(ingredient.updated_at().to_rfc3339())
        .bind(ingredient.is_deleted() as i64)
        .bind(ingredient.last_error().map(|e| e.to_string()))
        .bind(ingredient.local_id().to_string())
        .bind(expected_updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let applied = result.rows_affected() > 0;
        if !applied {
            tracing::debug!(
                local_id = %ingredient.local_id(),
                "Post-sync write skipped, record was edited during the pass"
            );
        }
        Ok(applied)
    }

    async fn hard_delete_ingredient(&self, local_id: &LocalId) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM ingredients WHERE local_id = ?")
            .bind(local_id.to_string())
            .execute(&self.pool)
            .await?;

        tracing::debug!(local_id = %local_id, "Ingredient hard-deleted");
        Ok(())
    }

    // --- Dish operations ---

    async fn save_dish(&self, dish: &Dish) -> anyhow::Result<()> {
        let ingredients_json = serde_json::to_string(dish.ingredients())?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO dishes (
                local_id, server_id, name, ingredients, created_at,
                sync_status, updated_at, deleted
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(dish.local_id().to_string())
        .bind(dish.server_id().map(|id| id.as_str().to_string()))
        .bind(dish.name())
        .bind(ingredients_json)
        .bind(dish.created_at().to_rfc3339())
        .bind(dish.sync_status().as_str())
        .bind(dish.updated_at().to_rfc3339())
        .bind(dish.is_deleted() as i64)
        .execute(&self.pool)
        .await?;

        tracing::debug!(local_id = %dish.local_id(), "Dish saved");
        Ok(())
    }

    async fn get_dish(&self, local_id: &LocalId) -> anyhow::Result<Option<Dish>> {
        let row = sqlx::query("SELECT * FROM dishes WHERE local_id = ?")
            .bind(local_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(dish_from_row).transpose().map_err(Into::into)
    }

    async fn get_dish_by_server_id(&self, server_id: &ServerId) -> anyhow::Result<Option<Dish>> {
        let row = sqlx::query("SELECT * FROM dishes WHERE server_id = ?")
            .bind(server_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(dish_from_row).transpose().map_err(Into::into)
    }

    async fn fetch_all_dishes(&self) -> anyhow::Result<Vec<Dish>> {
        let rows = sqlx::query("SELECT * FROM dishes WHERE deleted = 0 ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(dish_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    async fn fetch_dishes_for_sync(&self) -> anyhow::Result<Vec<Dish>> {
        let rows = sqlx::query(
            "SELECT * FROM dishes WHERE sync_status = 'pending' ORDER BY updated_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(dish_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    async fn hard_delete_dish(&self, local_id: &LocalId) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM dishes WHERE local_id = ?")
            .bind(local_id.to_string())
            .execute(&self.pool)
            .await?;

        tracing::debug!(local_id = %local_id, "Dish hard-deleted");
        Ok(())
    }
}
