//! Record store port (driven/secondary port)
//!
//! This module defines the interface for the Local Store: the durable,
//! offline-first home of all inventory and recipe records. The UI layer
//! reads from this store exclusively; the sync engine reconciles it with
//! the remote service in the background.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   (SQLite, filesystem, etc.) and don't need domain-level classification.
//! - All write operations take references to domain entities, allowing
//!   the caller to retain ownership.
//! - Read operations come in two flavours: UI reads, which hide
//!   tombstones, and sync reads, which include them.

use chrono::{DateTime, Utc};

use crate::domain::{Dish, Ingredient, LocalId, ServerId};

/// Port trait for the local record store
///
/// This is the primary persistence interface. Individual operations are
/// atomic; implementations may use transactions internally.
#[async_trait::async_trait]
pub trait IRecordStore: Send + Sync {
    // --- Ingredient operations ---

    /// Saves an ingredient (insert or update, keyed by local ID)
    async fn save_ingredient(&self, ingredient: &Ingredient) -> anyhow::Result<()>;

    /// Retrieves an ingredient by its local ID, tombstones included
    async fn get_ingredient(&self, local_id: &LocalId) -> anyhow::Result<Option<Ingredient>>;

    /// Retrieves an ingredient by its server ID, tombstones included
    async fn get_ingredient_by_server_id(
        &self,
        server_id: &ServerId,
    ) -> anyhow::Result<Option<Ingredient>>;

    /// Retrieves all visible (non-tombstone) ingredients for the UI
    ///
    /// Ordered by creation time, newest first.
    async fn fetch_all_ingredients(&self) -> anyhow::Result<Vec<Ingredient>>;

    /// Retrieves all ingredients in the sync work queue
    ///
    /// Includes tombstones; excludes synced records and failed records
    /// parked for user attention.
    async fn fetch_ingredients_for_sync(&self) -> anyhow::Result<Vec<Ingredient>>;

    /// Conditionally writes back post-sync state
    ///
    /// The write applies only if the stored `updated_at` still equals
    /// `expected_updated_at`; returns `false` when it does not, which
    /// means the user edited the record while the sync pass was running
    /// and the local edit must win.
    async fn update_ingredient_after_sync(
        &self,
        ingredient: &Ingredient,
        expected_updated_at: DateTime<Utc>,
    ) -> anyhow::Result<bool>;

    /// Physically removes a record; the final step of the two-phase delete
    async fn hard_delete_ingredient(&self, local_id: &LocalId) -> anyhow::Result<()>;

    // --- Dish operations ---

    /// Saves a dish (insert or update, keyed by local ID)
    async fn save_dish(&self, dish: &Dish) -> anyhow::Result<()>;

    /// Retrieves a dish by its local ID, tombstones included
    async fn get_dish(&self, local_id: &LocalId) -> anyhow::Result<Option<Dish>>;

    /// Retrieves a dish by its server ID, tombstones included
    async fn get_dish_by_server_id(&self, server_id: &ServerId) -> anyhow::Result<Option<Dish>>;

    /// Retrieves all visible (non-tombstone) dishes for the UI
    ///
    /// Ordered by creation time, newest first.
    async fn fetch_all_dishes(&self) -> anyhow::Result<Vec<Dish>>;

    /// Retrieves all dishes in the sync work queue, tombstones included
    async fn fetch_dishes_for_sync(&self) -> anyhow::Result<Vec<Dish>>;

    /// Physically removes a dish record
    async fn hard_delete_dish(&self, local_id: &LocalId) -> anyhow::Result<()>;
}
