//! Dish domain entity
//!
//! A dish is a saved recipe: a name plus the ingredient lines needed to
//! cook it. Dishes follow the same dual-identity and sync lifecycle as
//! ingredients but carry far fewer mutations, so the entity is leaner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ingredient::SyncStatus;
use super::newtypes::{LocalId, ServerId};

/// One ingredient line of a recipe (not linked to inventory records)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishIngredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

/// A saved recipe, synchronized like an ingredient record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    local_id: LocalId,
    server_id: Option<ServerId>,
    name: String,
    ingredients: Vec<DishIngredient>,
    created_at: DateTime<Utc>,
    sync_status: SyncStatus,
    updated_at: DateTime<Utc>,
    deleted: bool,
}

impl Dish {
    /// Creates a new locally-pending dish
    pub fn new(name: impl Into<String>, ingredients: Vec<DishIngredient>) -> Self {
        let now = Utc::now();
        Self {
            local_id: LocalId::new(),
            server_id: None,
            name: name.into(),
            ingredients,
            created_at: now,
            sync_status: SyncStatus::Pending,
            updated_at: now,
            deleted: false,
        }
    }

    /// Creates a synced dish from a record fetched from the remote service
    pub fn from_remote(
        server_id: ServerId,
        name: impl Into<String>,
        ingredients: Vec<DishIngredient>,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            local_id: LocalId::new(),
            server_id: Some(server_id),
            name: name.into(),
            ingredients,
            created_at: created_at.unwrap_or(now),
            sync_status: SyncStatus::Synced,
            updated_at: updated_at.unwrap_or(now),
            deleted: false,
        }
    }

    pub fn local_id(&self) -> &LocalId {
        &self.local_id
    }

    pub fn server_id(&self) -> Option<&ServerId> {
        self.server_id.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ingredients(&self) -> &[DishIngredient] {
        &self.ingredients
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync_status
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn needs_sync(&self) -> bool {
        self.sync_status.needs_sync()
    }

    /// Marks the dish soft-deleted (tombstone)
    pub fn soft_delete(&mut self) {
        self.deleted = true;
        self.sync_status = SyncStatus::Pending;
        self.updated_at = Utc::now();
    }

    /// Attaches the server identity after the first accepted creation
    ///
    /// Unlike ingredients, dishes are never edited after creation, so a
    /// conflicting second assignment cannot occur in practice; the last
    /// write still wins only when no identity exists yet.
    pub fn confirm_created(&mut self, server_id: ServerId) {
        if self.server_id.is_none() {
            self.server_id = Some(server_id);
        }
        self.sync_status = SyncStatus::Synced;
    }

    /// Marks the last local state as accepted remotely
    pub fn confirm_synced(&mut self) {
        self.sync_status = SyncStatus::Synced;
    }

    /// Marks the dish as rejected by the server
    pub fn mark_failed(&mut self) {
        self.sync_status = SyncStatus::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carbonara() -> Dish {
        Dish::new(
            "carbonara",
            vec![
                DishIngredient {
                    name: "spaghetti".into(),
                    quantity: 200.0,
                    unit: "g".into(),
                },
                DishIngredient {
                    name: "eggs".into(),
                    quantity: 3.0,
                    unit: "pcs".into(),
                },
            ],
        )
    }

    #[test]
    fn test_new_is_pending() {
        let d = carbonara();
        assert_eq!(d.sync_status(), SyncStatus::Pending);
        assert!(d.server_id().is_none());
        assert_eq!(d.ingredients().len(), 2);
    }

    #[test]
    fn test_confirm_created() {
        let mut d = carbonara();
        d.confirm_created(ServerId::new("dish-1").unwrap());
        assert_eq!(d.sync_status(), SyncStatus::Synced);
        assert_eq!(d.server_id().unwrap().as_str(), "dish-1");
    }

    #[test]
    fn test_confirm_created_keeps_first_identity() {
        let mut d = carbonara();
        d.confirm_created(ServerId::new("dish-1").unwrap());
        d.confirm_created(ServerId::new("dish-2").unwrap());
        assert_eq!(d.server_id().unwrap().as_str(), "dish-1");
    }

    #[test]
    fn test_soft_delete() {
        let mut d = carbonara();
        d.confirm_created(ServerId::new("dish-1").unwrap());
        d.soft_delete();
        assert!(d.is_deleted());
        assert!(d.needs_sync());
    }

    #[test]
    fn test_from_remote_is_synced() {
        let d = Dish::from_remote(
            ServerId::new("dish-9").unwrap(),
            "omelette",
            vec![],
            None,
            None,
        );
        assert_eq!(d.sync_status(), SyncStatus::Synced);
    }
}
