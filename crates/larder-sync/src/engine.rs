//! Record synchronization engine
//!
//! The [`SyncEngine`] reconciles the local record store with the remote
//! inventory service in two phases:
//!
//! 1. **Push**: snapshot the pending work queue and, per record, create,
//!    update, or delete on the server according to the record's phase.
//! 2. **Pull**: fetch the server's state and merge it into the local
//!    store, preserving local identities and pending local edits.
//!
//! ## Failure handling
//!
//! Failures are handled per record; one bad record never aborts the
//! pass. The engine branches on the [`RemoteError`] class:
//!
//! - `Transport`: the record stays pending and is retried next pass
//! - `Rejection`: the record is parked as failed until the user edits it
//! - `NotFound` on update/delete: another device already removed the
//!   record, so the local copy is cleaned up
//! - `Auth`: the whole pass aborts, nothing can succeed without a login
//!
//! ## Concurrent edits
//!
//! The UI may write to the store while a pass is running. Every
//! post-sync write-back is conditional on the `updated_at` the pass
//! snapshotted; a lost race means the user's edit wins and the record
//! simply stays pending.

use std::sync::Arc;

use tracing::{debug, info, warn};

use larder_core::domain::{Dish, Ingredient, RecordPhase};
use larder_core::ports::{IRecordStore, IRemoteService, RemoteDish, RemoteError, RemoteIngredient};

// ============================================================================
// SyncSummary / SyncError
// ============================================================================

/// What a completed sync pass did
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    /// Records created or updated on the server
    pub pushed: u32,
    /// Tombstones resolved (remote delete confirmed, local row removed)
    pub deleted: u32,
    /// Records created or updated locally from the server's state
    pub pulled: u32,
    /// Records parked as failed after a server rejection
    pub rejected: u32,
    /// Records deferred to the next pass after a transport failure
    pub deferred: u32,
    /// Non-fatal errors encountered during the pass
    pub errors: Vec<String>,
    /// Wall-clock duration of the pass in milliseconds
    pub duration_ms: u64,
}

/// Fatal failure of a sync pass
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The server refused the credentials; every pending record is left
    /// untouched for the pass after the user logs in again
    #[error("authentication required, run 'larder login'")]
    AuthRequired,

    /// The local store failed; nothing sensible can continue
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

// ============================================================================
// SyncEngine
// ============================================================================

/// Reconciles the local record store with the remote inventory service
///
/// ## Dependencies
///
/// - `store`: the local source of truth for the UI (IRecordStore)
/// - `remote`: the family's shared system of record (IRemoteService)
pub struct SyncEngine {
    store: Arc<dyn IRecordStore>,
    remote: Arc<dyn IRemoteService>,
}

impl SyncEngine {
    /// Creates a new `SyncEngine` with the given dependencies
    pub fn new(store: Arc<dyn IRecordStore>, remote: Arc<dyn IRemoteService>) -> Self {
        Self { store, remote }
    }

    /// Performs one full sync pass
    ///
    /// 1. Push pending ingredients (creates, updates, deletes)
    /// 2. Push pending dishes (creates, deletes)
    /// 3. Pull and merge the server's ingredients
    /// 4. Pull missing dishes
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::AuthRequired`] when the server refuses the
    /// credentials, or [`SyncError::Storage`] when the local store fails.
    /// Per-record remote failures never fail the pass; they are counted
    /// in the returned [`SyncSummary`].
    #[tracing::instrument(skip(self))]
    pub async fn sync(&self) -> Result<SyncSummary, SyncError> {
        let start = std::time::Instant::now();
        let mut summary = SyncSummary::default();

        info!("Starting sync pass");

        self.push_ingredients(&mut summary).await?;
        self.push_dishes(&mut summary).await?;
        self.pull_ingredients(&mut summary).await?;
        self.pull_dishes(&mut summary).await?;

        summary.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            pushed = summary.pushed,
            deleted = summary.deleted,
            pulled = summary.pulled,
            rejected = summary.rejected,
            deferred = summary.deferred,
            duration_ms = summary.duration_ms,
            "Sync pass finished"
        );

        Ok(summary)
    }

    // ========================================================================
    // Push phase: ingredients
    // ========================================================================

    async fn push_ingredients(&self, summary: &mut SyncSummary) -> Result<(), SyncError> {
        let queue = self.store.fetch_ingredients_for_sync().await?;
        debug!(records = queue.len(), "Ingredient work queue snapshot");

        for record in queue {
            match record.phase() {
                RecordPhase::TombstoneUnsynced => {
                    // Never reached the server; nothing to tell it
                    self.store.hard_delete_ingredient(record.local_id()).await?;
                    summary.deleted += 1;
                }
                RecordPhase::TombstonePending => {
                    self.push_ingredient_delete(record, summary).await?;
                }
                RecordPhase::ActivePending => match record.server_id() {
                    None => self.push_ingredient_create(record, summary).await?,
                    Some(_) => self.push_ingredient_update(record, summary).await?,
                },
                RecordPhase::ActiveSynced => {}
            }
        }

        Ok(())
    }

    /// Pushes a first-time creation and attaches the returned identity
    async fn push_ingredient_create(
        &self,
        mut record: Ingredient,
        summary: &mut SyncSummary,
    ) -> Result<(), SyncError> {
        let snapshot_time = record.updated_at();

        match self.remote.create_ingredient(&record).await {
            Ok(server_id) => {
                if let Err(e) = record.confirm_created(server_id.clone()) {
                    summary.errors.push(e.to_string());
                    return Ok(());
                }
                let applied = self
                    .store
                    .update_ingredient_after_sync(&record, snapshot_time)
                    .await?;
                if !applied {
                    // The user edited the record mid-request. The server
                    // identity must stick, the edit must stay pending.
                    if let Some(mut current) =
                        self.store.get_ingredient(record.local_id()).await?
                    {
                        match current.attach_server_id(server_id) {
                            Ok(()) => self.store.save_ingredient(&current).await?,
                            Err(e) => summary.errors.push(e.to_string()),
                        }
                    }
                }
                summary.pushed += 1;
            }
            Err(e) => self.handle_push_failure(record, e, summary).await?,
        }

        Ok(())
    }

    /// Pushes the current state of an already-created record
    async fn push_ingredient_update(
        &self,
        mut record: Ingredient,
        summary: &mut SyncSummary,
    ) -> Result<(), SyncError> {
        let snapshot_time = record.updated_at();
        // Phase dispatch guarantees the identity is present
        let Some(server_id) = record.server_id().cloned() else {
            return Ok(());
        };

        match self.remote.update_ingredient(&server_id, &record).await {
            Ok(()) => {
                record.confirm_synced();
                // A lost race means a newer edit exists; it re-pushes next pass
                self.store
                    .update_ingredient_after_sync(&record, snapshot_time)
                    .await?;
                summary.pushed += 1;
            }
            Err(RemoteError::NotFound) => {
                // Another device deleted the record; the server wins deletes
                info!(local_id = %record.local_id(), "Record deleted remotely, removing local copy");
                self.store.hard_delete_ingredient(record.local_id()).await?;
                summary.deleted += 1;
            }
            Err(e) => self.handle_push_failure(record, e, summary).await?,
        }

        Ok(())
    }

    /// Confirms a tombstone's deletion on the server, then locally
    async fn push_ingredient_delete(
        &self,
        record: Ingredient,
        summary: &mut SyncSummary,
    ) -> Result<(), SyncError> {
        let Some(server_id) = record.server_id().cloned() else {
            return Ok(());
        };

        match self.remote.delete_ingredient(&server_id).await {
            // Already gone counts as confirmed
            Ok(()) | Err(RemoteError::NotFound) => {
                self.store.hard_delete_ingredient(record.local_id()).await?;
                summary.deleted += 1;
            }
            Err(e) => self.handle_push_failure(record, e, summary).await?,
        }

        Ok(())
    }

    /// Common branch for transport, rejection, and auth failures
    async fn handle_push_failure(
        &self,
        mut record: Ingredient,
        error: RemoteError,
        summary: &mut SyncSummary,
    ) -> Result<(), SyncError> {
        match error {
            RemoteError::Auth => {
                warn!("Authentication rejected, aborting sync pass");
                return Err(SyncError::AuthRequired);
            }
            RemoteError::Transport(reason) => {
                debug!(local_id = %record.local_id(), %reason, "Transport failure, record deferred");
                summary.deferred += 1;
            }
            RemoteError::Rejection(reason) => {
                warn!(local_id = %record.local_id(), %reason, "Server rejected record");
                let snapshot_time = record.updated_at();
                record.mark_failed(&reason);
                // A lost race means the user already re-edited; the fresh
                // pending state supersedes the rejection
                self.store
                    .update_ingredient_after_sync(&record, snapshot_time)
                    .await?;
                summary.rejected += 1;
            }
            RemoteError::NotFound => {
                // Callers handle NotFound where it has meaning; reaching
                // here (e.g. on create) is a server inconsistency
                summary
                    .errors
                    .push(format!("Unexpected not-found for {}", record.local_id()));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Push phase: dishes
    // ========================================================================

    async fn push_dishes(&self, summary: &mut SyncSummary) -> Result<(), SyncError> {
        let queue = self.store.fetch_dishes_for_sync().await?;
        debug!(records = queue.len(), "Dish work queue snapshot");

        for mut dish in queue {
            if dish.is_deleted() {
                match dish.server_id().cloned() {
                    None => {
                        self.store.hard_delete_dish(dish.local_id()).await?;
                        summary.deleted += 1;
                    }
                    Some(server_id) => match self.remote.delete_dish(&server_id).await {
                        Ok(()) | Err(RemoteError::NotFound) => {
                            self.store.hard_delete_dish(dish.local_id()).await?;
                            summary.deleted += 1;
                        }
                        Err(RemoteError::Auth) => return Err(SyncError::AuthRequired),
                        Err(RemoteError::Transport(reason)) => {
                            debug!(local_id = %dish.local_id(), %reason, "Dish delete deferred");
                            summary.deferred += 1;
                        }
                        Err(RemoteError::Rejection(reason)) => {
                            warn!(local_id = %dish.local_id(), %reason, "Dish delete rejected");
                            dish.mark_failed();
                            self.store.save_dish(&dish).await?;
                            summary.rejected += 1;
                        }
                    },
                }
                continue;
            }

            if dish.server_id().is_some() {
                // Dishes are immutable after creation; nothing to update
                dish.confirm_synced();
                self.store.save_dish(&dish).await?;
                continue;
            }

            match self.remote.create_dish(&dish).await {
                Ok(server_id) => {
                    dish.confirm_created(server_id);
                    self.store.save_dish(&dish).await?;
                    summary.pushed += 1;
                }
                Err(RemoteError::Auth) => return Err(SyncError::AuthRequired),
                Err(RemoteError::Transport(reason)) => {
                    debug!(local_id = %dish.local_id(), %reason, "Dish create deferred");
                    summary.deferred += 1;
                }
                Err(RemoteError::Rejection(reason)) => {
                    warn!(local_id = %dish.local_id(), %reason, "Dish rejected");
                    dish.mark_failed();
                    self.store.save_dish(&dish).await?;
                    summary.rejected += 1;
                }
                Err(RemoteError::NotFound) => {
                    summary
                        .errors
                        .push(format!("Unexpected not-found for {}", dish.local_id()));
                }
            }
        }

        Ok(())
    }

    // ========================================================================
    // Pull phase: ingredients
    // ========================================================================

    async fn pull_ingredients(&self, summary: &mut SyncSummary) -> Result<(), SyncError> {
        let remote_records = match self.remote.fetch_ingredients().await {
            Ok(records) => records,
            Err(RemoteError::Auth) => return Err(SyncError::AuthRequired),
            Err(e) => {
                // The push half still happened; skipping the pull is safe
                warn!(error = %e, "Pull skipped");
                summary.errors.push(format!("Pull skipped: {e}"));
                return Ok(());
            }
        };

        debug!(records = remote_records.len(), "Pulled server ingredients");

        for remote in remote_records {
            self.merge_remote_ingredient(remote, summary).await?;
        }

        Ok(())
    }

    /// Merges one server record into the local store
    ///
    /// Resolution rules:
    /// - unknown server ID: adopt the record with a fresh local identity
    /// - local tombstone: the pending delete wins until pushed
    /// - local pending edit: the local edit wins until pushed
    /// - otherwise: the server copy wins when strictly newer
    async fn merge_remote_ingredient(
        &self,
        remote: RemoteIngredient,
        summary: &mut SyncSummary,
    ) -> Result<(), SyncError> {
        let existing = self
            .store
            .get_ingredient_by_server_id(&remote.server_id)
            .await?;

        let Some(mut local) = existing else {
            let adopted = Ingredient::from_remote(
                remote.server_id,
                remote.name,
                remote.quantity,
                remote.unit,
                remote.storage_type,
                remote.expiration_date,
                remote.image_url,
                remote.created_at,
                remote.updated_at,
            );
            self.store.save_ingredient(&adopted).await?;
            summary.pulled += 1;
            return Ok(());
        };

        if local.is_deleted() || local.needs_sync() {
            debug!(local_id = %local.local_id(), "Local change pending, server copy ignored");
            return Ok(());
        }

        let remote_updated = match remote.updated_at {
            Some(ts) => ts,
            None => return Ok(()),
        };
        if remote_updated <= local.updated_at() {
            return Ok(());
        }

        let snapshot_time = local.updated_at();
        local.apply_remote(
            remote.name,
            remote.quantity,
            remote.unit,
            remote.storage_type,
            remote.expiration_date,
            remote.image_url,
            remote_updated,
        );
        let applied = self
            .store
            .update_ingredient_after_sync(&local, snapshot_time)
            .await?;
        if applied {
            summary.pulled += 1;
        }

        Ok(())
    }

    // ========================================================================
    // Pull phase: dishes
    // ========================================================================

    /// Adopts server dishes with no local counterpart (append-only)
    async fn pull_dishes(&self, summary: &mut SyncSummary) -> Result<(), SyncError> {
        let remote_dishes = match self.remote.fetch_dishes().await {
            Ok(records) => records,
            Err(RemoteError::Auth) => return Err(SyncError::AuthRequired),
            Err(e) => {
                warn!(error = %e, "Dish pull skipped");
                summary.errors.push(format!("Dish pull skipped: {e}"));
                return Ok(());
            }
        };

        for remote in remote_dishes {
            if self
                .store
                .get_dish_by_server_id(&remote.server_id)
                .await?
                .is_none()
            {
                let adopted = remote_dish_to_local(remote);
                self.store.save_dish(&adopted).await?;
                summary.pulled += 1;
            }
        }

        Ok(())
    }
}

fn remote_dish_to_local(remote: RemoteDish) -> Dish {
    Dish::from_remote(
        remote.server_id,
        remote.name,
        remote.ingredients,
        remote.created_at,
        remote.updated_at,
    )
}
