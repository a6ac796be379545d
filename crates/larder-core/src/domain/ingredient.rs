//! Ingredient domain entity
//!
//! This module defines the Ingredient entity, the central synchronized
//! record of the application. An ingredient is created locally the instant
//! the user commits it, independent of connectivity, and reconciled with
//! the remote service by later sync passes.
//!
//! ## State Machine
//!
//! ```text
//!                create            remote create ok
//!     ┌────────────────► ┌─────────┐ ──────────────► ┌─────────┐
//!                        │ Pending │                 │ Synced  │
//!     local edit ──────► └─────────┘ ◄── local edit  └─────────┘
//!                             │
//!                rejection    │                        soft delete
//!                             ▼                            │
//!                        ┌─────────┐               ┌───────▼───────┐
//!                        │ Failed  │               │ tombstone     │
//!                        └─────────┘               │ (deleted +    │
//!                             │ re-edit            │  pending)     │
//!                             └──► Pending         └───────┬───────┘
//!                                                          │ remote delete
//!                                                          ▼ ok / not-found
//!                                                    hard-deleted
//! ```
//!
//! The tombstone flag crossed with the status gives four effective
//! phases, exposed as [`RecordPhase`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::DomainError;
use super::newtypes::{LocalId, ServerId};

// ============================================================================
// SyncStatus
// ============================================================================

/// Synchronization status of a local record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Local mutation not yet acknowledged by the remote service
    #[default]
    Pending,
    /// Last known local state has been accepted remotely
    Synced,
    /// The remote service rejected the record; requires user attention
    Failed,
}

impl SyncStatus {
    /// Returns true if the record belongs in the sync work queue
    ///
    /// Failed records are parked until the user edits them, so only
    /// Pending qualifies.
    pub fn needs_sync(&self) -> bool {
        matches!(self, SyncStatus::Pending)
    }

    /// Stable string form used for persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Synced => "synced",
            SyncStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SyncStatus::Pending),
            "synced" => Ok(SyncStatus::Synced),
            "failed" => Ok(SyncStatus::Failed),
            other => Err(DomainError::ValidationFailed(format!(
                "Unknown sync status: {other}"
            ))),
        }
    }
}

// ============================================================================
// StorageType
// ============================================================================

/// Where the ingredient is kept, which also drives the default shelf life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    /// Freezer storage (default shelf life 90 days)
    Frozen,
    /// Refrigerated storage (default shelf life 7 days)
    Chilled,
    /// Room-temperature storage (default shelf life 30 days)
    Pantry,
}

impl StorageType {
    /// Default shelf life applied when no expiration date is provided
    pub fn default_shelf_life(&self) -> Duration {
        match self {
            StorageType::Frozen => Duration::days(90),
            StorageType::Chilled => Duration::days(7),
            StorageType::Pantry => Duration::days(30),
        }
    }

    /// Stable string form used for persistence and the wire format
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Frozen => "frozen",
            StorageType::Chilled => "chilled",
            StorageType::Pantry => "pantry",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frozen" => Ok(StorageType::Frozen),
            // "refrigerated" and "room" are aliases the server emits
            "chilled" | "refrigerated" => Ok(StorageType::Chilled),
            "pantry" | "room" => Ok(StorageType::Pantry),
            other => Err(DomainError::InvalidStorageType(other.to_string())),
        }
    }
}

// ============================================================================
// RecordPhase
// ============================================================================

/// Effective phase of a record, derived from status x tombstone x identity
///
/// The sync engine branches on this rather than inspecting raw fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordPhase {
    /// Visible record with a local mutation awaiting upload
    ActivePending,
    /// Visible record whose last state was accepted remotely
    ActiveSynced,
    /// Soft-deleted record with a server identity; the remote delete
    /// has not been confirmed yet
    TombstonePending,
    /// Soft-deleted record that never reached the server; removable
    /// without any network call
    TombstoneUnsynced,
}

// ============================================================================
// Ingredient
// ============================================================================

/// The central synchronized entity: one item in the household inventory
///
/// Keyed by [`LocalId`] in the Local Store; gains a [`ServerId`] after the
/// first accepted remote creation and keeps it forever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Client-generated primary key, immutable once assigned
    local_id: LocalId,
    /// Remote identity; None until the first accepted creation
    server_id: Option<ServerId>,
    /// Display name
    name: String,
    /// Amount on hand
    quantity: f64,
    /// Unit of the quantity (free-form, e.g. "L", "pcs")
    unit: String,
    /// Where the item is kept
    storage_type: StorageType,
    /// When the item expires
    expiration_date: Option<DateTime<Utc>>,
    /// When the item was created locally
    created_at: DateTime<Utc>,
    /// Optional preset image for the item
    image_url: Option<String>,
    /// Synchronization status, see module docs
    sync_status: SyncStatus,
    /// Timestamp of the last local mutation; staleness key for merges
    updated_at: DateTime<Utc>,
    /// Tombstone flag; soft-deleted records are hidden from normal reads
    /// but retained until the remote delete is confirmed
    deleted: bool,
    /// Human-readable reason for the last rejection, if any
    last_error: Option<String>,
}

impl Ingredient {
    /// Creates a new locally-pending ingredient
    ///
    /// The record is immediately usable: it has a [`LocalId`], a creation
    /// timestamp, and an expiration date derived from the storage type
    /// when none is supplied later via [`set_expiration_date`].
    ///
    /// [`set_expiration_date`]: Ingredient::set_expiration_date
    pub fn new(
        name: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        storage_type: StorageType,
    ) -> Self {
        let now = Utc::now();
        Self {
            local_id: LocalId::new(),
            server_id: None,
            name: name.into(),
            quantity,
            unit: unit.into(),
            storage_type,
            expiration_date: Some(now + storage_type.default_shelf_life()),
            created_at: now,
            image_url: None,
            sync_status: SyncStatus::Pending,
            updated_at: now,
            deleted: false,
            last_error: None,
        }
    }

    /// Creates a synced ingredient from a record fetched from the remote
    /// service that has no local counterpart yet
    ///
    /// A fresh [`LocalId`] is minted; the record starts in `Synced` state
    /// because the server copy is, by construction, the accepted state.
    pub fn from_remote(
        server_id: ServerId,
        name: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        storage_type: StorageType,
        expiration_date: Option<DateTime<Utc>>,
        image_url: Option<String>,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            local_id: LocalId::new(),
            server_id: Some(server_id),
            name: name.into(),
            quantity,
            unit: unit.into(),
            storage_type,
            expiration_date,
            created_at: created_at.unwrap_or(now),
            image_url,
            sync_status: SyncStatus::Synced,
            updated_at: updated_at.unwrap_or(now),
            deleted: false,
            last_error: None,
        }
    }

    // --- Getters ---

    /// Returns the local (client-generated) identifier
    pub fn local_id(&self) -> &LocalId {
        &self.local_id
    }

    /// Returns the server identifier, if assigned
    pub fn server_id(&self) -> Option<&ServerId> {
        self.server_id.as_ref()
    }

    /// Returns the display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the quantity on hand
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Returns the quantity unit
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Returns the storage type
    pub fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    /// Returns the expiration date
    pub fn expiration_date(&self) -> Option<DateTime<Utc>> {
        self.expiration_date
    }

    /// Returns the local creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the image URL, if any
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Returns the sync status
    pub fn sync_status(&self) -> SyncStatus {
        self.sync_status
    }

    /// Returns the timestamp of the last local mutation
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true if the record is soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Returns the last rejection reason, if the record is failed
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns true if the record belongs in the sync work queue
    pub fn needs_sync(&self) -> bool {
        self.sync_status.needs_sync()
    }

    /// Derives the effective phase the sync engine branches on
    pub fn phase(&self) -> RecordPhase {
        match (self.deleted, self.server_id.is_some(), self.sync_status) {
            (true, true, _) => RecordPhase::TombstonePending,
            (true, false, _) => RecordPhase::TombstoneUnsynced,
            (false, _, SyncStatus::Synced) => RecordPhase::ActiveSynced,
            (false, _, _) => RecordPhase::ActivePending,
        }
    }

    // --- Local mutations (UI edits) ---

    /// Records a local mutation: bumps `updated_at` and re-enters Pending
    ///
    /// Every UI edit path must call this so the record lands back in the
    /// sync work queue. Clears any stale rejection reason.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.sync_status = SyncStatus::Pending;
        self.last_error = None;
    }

    /// Sets the display name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    /// Sets the quantity
    pub fn set_quantity(&mut self, quantity: f64) {
        self.quantity = quantity;
        self.touch();
    }

    /// Sets the unit
    pub fn set_unit(&mut self, unit: impl Into<String>) {
        self.unit = unit.into();
        self.touch();
    }

    /// Sets the storage type
    pub fn set_storage_type(&mut self, storage_type: StorageType) {
        self.storage_type = storage_type;
        self.touch();
    }

    /// Sets the expiration date
    pub fn set_expiration_date(&mut self, date: Option<DateTime<Utc>>) {
        self.expiration_date = date;
        self.touch();
    }

    /// Sets the image URL without re-entering Pending
    ///
    /// Image lookup is a cosmetic local concern; it must not cause a
    /// redundant upload of an otherwise synced record.
    pub fn set_image_url(&mut self, url: Option<String>) {
        self.image_url = url;
    }

    /// Marks the record soft-deleted (tombstone)
    ///
    /// The record disappears from normal reads but stays in the store
    /// until a sync pass confirms the remote delete.
    pub fn soft_delete(&mut self) {
        self.deleted = true;
        self.sync_status = SyncStatus::Pending;
        self.updated_at = Utc::now();
    }

    // --- Sync-engine transitions ---

    /// Attaches the server identity after the first accepted creation
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::ServerIdMismatch`] if a different server ID
    /// was already assigned; a server ID is never rewritten.
    pub fn confirm_created(&mut self, server_id: ServerId) -> Result<(), DomainError> {
        match &self.server_id {
            Some(existing) if *existing != server_id => Err(DomainError::ServerIdMismatch {
                existing: existing.to_string(),
                incoming: server_id.to_string(),
            }),
            _ => {
                self.server_id = Some(server_id);
                self.sync_status = SyncStatus::Synced;
                self.last_error = None;
                Ok(())
            }
        }
    }

    /// Attaches the server identity without touching the sync status
    ///
    /// Used when the remote create succeeds but the user edited the
    /// record while the request was in flight: the identity must stick,
    /// the edit must stay pending.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::ServerIdMismatch`] if a different server ID
    /// was already assigned.
    pub fn attach_server_id(&mut self, server_id: ServerId) -> Result<(), DomainError> {
        match &self.server_id {
            Some(existing) if *existing != server_id => Err(DomainError::ServerIdMismatch {
                existing: existing.to_string(),
                incoming: server_id.to_string(),
            }),
            _ => {
                self.server_id = Some(server_id);
                Ok(())
            }
        }
    }

    /// Marks the last local state as accepted remotely
    pub fn confirm_synced(&mut self) {
        self.sync_status = SyncStatus::Synced;
        self.last_error = None;
    }

    /// Marks the record as rejected by the server
    ///
    /// Failed records are excluded from automatic retry until the user
    /// edits them (which calls [`touch`](Ingredient::touch)).
    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.sync_status = SyncStatus::Failed;
        self.last_error = Some(reason.into());
    }

    /// Overwrites descriptive fields from a newer server copy
    ///
    /// Used by the pull/merge phase when the server timestamp wins the
    /// tie-break. The `local_id` is preserved so the UI never sees the
    /// logical entity duplicated.
    pub fn apply_remote(
        &mut self,
        name: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        storage_type: StorageType,
        expiration_date: Option<DateTime<Utc>>,
        image_url: Option<String>,
        updated_at: DateTime<Utc>,
    ) {
        self.name = name.into();
        self.quantity = quantity;
        self.unit = unit.into();
        self.storage_type = storage_type;
        self.expiration_date = expiration_date;
        if image_url.is_some() {
            self.image_url = image_url;
        }
        self.updated_at = updated_at;
        self.sync_status = SyncStatus::Synced;
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn milk() -> Ingredient {
        Ingredient::new("milk", 1.0, "L", StorageType::Chilled)
    }

    mod status_tests {
        use super::*;

        #[test]
        fn test_needs_sync() {
            assert!(SyncStatus::Pending.needs_sync());
            assert!(!SyncStatus::Failed.needs_sync());
            assert!(!SyncStatus::Synced.needs_sync());
        }

        #[test]
        fn test_string_roundtrip() {
            for status in [SyncStatus::Pending, SyncStatus::Synced, SyncStatus::Failed] {
                let parsed: SyncStatus = status.as_str().parse().unwrap();
                assert_eq!(parsed, status);
            }
        }

        #[test]
        fn test_rejects_unknown() {
            assert!("done".parse::<SyncStatus>().is_err());
        }
    }

    mod storage_type_tests {
        use super::*;

        #[test]
        fn test_shelf_life() {
            assert_eq!(StorageType::Frozen.default_shelf_life(), Duration::days(90));
            assert_eq!(StorageType::Chilled.default_shelf_life(), Duration::days(7));
            assert_eq!(StorageType::Pantry.default_shelf_life(), Duration::days(30));
        }

        #[test]
        fn test_server_aliases() {
            assert_eq!(
                "refrigerated".parse::<StorageType>().unwrap(),
                StorageType::Chilled
            );
            assert_eq!("room".parse::<StorageType>().unwrap(), StorageType::Pantry);
        }

        #[test]
        fn test_rejects_unknown() {
            assert!("cellar".parse::<StorageType>().is_err());
        }
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn test_new_is_pending_without_server_id() {
            let m = milk();
            assert_eq!(m.sync_status(), SyncStatus::Pending);
            assert!(m.server_id().is_none());
            assert!(!m.is_deleted());
            assert_eq!(m.phase(), RecordPhase::ActivePending);
        }

        #[test]
        fn test_new_derives_expiration_from_storage() {
            let m = milk();
            let expires = m.expiration_date().unwrap();
            let delta = expires - m.created_at();
            assert_eq!(delta.num_days(), 7);
        }

        #[test]
        fn test_confirm_created_attaches_server_id() {
            let mut m = milk();
            m.confirm_created(ServerId::new("srv-42").unwrap()).unwrap();
            assert_eq!(m.server_id().unwrap().as_str(), "srv-42");
            assert_eq!(m.sync_status(), SyncStatus::Synced);
            assert_eq!(m.phase(), RecordPhase::ActiveSynced);
        }

        #[test]
        fn test_confirm_created_is_idempotent() {
            let mut m = milk();
            let id = ServerId::new("srv-42").unwrap();
            m.confirm_created(id.clone()).unwrap();
            m.confirm_created(id).unwrap();
            assert_eq!(m.server_id().unwrap().as_str(), "srv-42");
        }

        #[test]
        fn test_server_id_never_rewritten() {
            let mut m = milk();
            m.confirm_created(ServerId::new("srv-42").unwrap()).unwrap();
            let err = m
                .confirm_created(ServerId::new("srv-99").unwrap())
                .unwrap_err();
            assert!(matches!(err, DomainError::ServerIdMismatch { .. }));
            assert_eq!(m.server_id().unwrap().as_str(), "srv-42");
        }

        #[test]
        fn test_attach_server_id_keeps_pending_status() {
            let mut m = milk();
            m.set_quantity(0.5);
            m.attach_server_id(ServerId::new("srv-42").unwrap()).unwrap();
            assert_eq!(m.server_id().unwrap().as_str(), "srv-42");
            assert_eq!(m.sync_status(), SyncStatus::Pending);
        }

        #[test]
        fn test_touch_reenters_pending() {
            let mut m = milk();
            m.confirm_created(ServerId::new("srv-42").unwrap()).unwrap();
            m.set_quantity(0.5);
            assert_eq!(m.sync_status(), SyncStatus::Pending);
            assert_eq!(m.phase(), RecordPhase::ActivePending);
        }

        #[test]
        fn test_touch_clears_failure() {
            let mut m = milk();
            m.mark_failed("name too long");
            assert_eq!(m.sync_status(), SyncStatus::Failed);
            assert_eq!(m.last_error(), Some("name too long"));

            m.set_name("milk 2%");
            assert_eq!(m.sync_status(), SyncStatus::Pending);
            assert!(m.last_error().is_none());
        }

        #[test]
        fn test_failed_is_parked_until_edited() {
            let mut m = milk();
            m.mark_failed("rejected");
            assert!(!m.needs_sync());

            m.set_quantity(2.0);
            assert!(m.needs_sync());
        }

        #[test]
        fn test_image_url_does_not_touch() {
            let mut m = milk();
            m.confirm_created(ServerId::new("srv-42").unwrap()).unwrap();
            m.set_image_url(Some("https://cdn.example.com/milk.png".into()));
            assert_eq!(m.sync_status(), SyncStatus::Synced);
        }
    }

    mod tombstone_tests {
        use super::*;

        #[test]
        fn test_soft_delete_unsynced_record() {
            let mut m = milk();
            m.soft_delete();
            assert!(m.is_deleted());
            assert_eq!(m.phase(), RecordPhase::TombstoneUnsynced);
        }

        #[test]
        fn test_soft_delete_synced_record() {
            let mut m = milk();
            m.confirm_created(ServerId::new("srv-42").unwrap()).unwrap();
            m.soft_delete();
            assert_eq!(m.sync_status(), SyncStatus::Pending);
            assert_eq!(m.phase(), RecordPhase::TombstonePending);
        }
    }

    mod merge_tests {
        use super::*;

        #[test]
        fn test_from_remote_is_synced() {
            let m = Ingredient::from_remote(
                ServerId::new("srv-7").unwrap(),
                "eggs",
                12.0,
                "pcs",
                StorageType::Chilled,
                None,
                None,
                None,
                None,
            );
            assert_eq!(m.sync_status(), SyncStatus::Synced);
            assert_eq!(m.server_id().unwrap().as_str(), "srv-7");
        }

        #[test]
        fn test_apply_remote_preserves_local_id() {
            let mut m = milk();
            m.confirm_created(ServerId::new("srv-42").unwrap()).unwrap();
            let local_id = *m.local_id();

            let server_time = Utc::now();
            m.apply_remote(
                "whole milk",
                2.0,
                "L",
                StorageType::Chilled,
                None,
                None,
                server_time,
            );

            assert_eq!(m.local_id(), &local_id);
            assert_eq!(m.name(), "whole milk");
            assert_eq!(m.updated_at(), server_time);
            assert_eq!(m.sync_status(), SyncStatus::Synced);
        }

        #[test]
        fn test_apply_remote_keeps_local_image_when_server_has_none() {
            let mut m = milk();
            m.set_image_url(Some("https://cdn.example.com/milk.png".into()));
            m.apply_remote("milk", 1.0, "L", StorageType::Chilled, None, None, Utc::now());
            assert!(m.image_url().is_some());
        }
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut m = milk();
        m.confirm_created(ServerId::new("srv-42").unwrap()).unwrap();
        let json = serde_json::to_string(&m).unwrap();
        let back: Ingredient = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
