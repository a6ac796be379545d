//! CLI commands and shared wiring helpers
//!
//! Every command is its own module with an `execute` method; the
//! helpers here do the composition-root work they all share: open the
//! database behind the configured path, load the persisted session,
//! and run the post-mutation sync pass.

pub mod add;
pub mod dish;
pub mod edit;
pub mod list;
pub mod login;
pub mod remove;
pub mod status;
pub mod sync;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use larder_api::HttpRemoteService;
use larder_core::config::Config;
use larder_core::domain::{Ingredient, Session};
use larder_core::ports::IRecordStore;
use larder_store::{DatabasePool, SqliteRecordStore};
use larder_sync::{SyncEngine, SyncError};

use crate::output::OutputFormatter;

/// Opens the record store at the configured database path
pub(crate) async fn open_store(config: &Config) -> Result<Arc<SqliteRecordStore>> {
    let pool = DatabasePool::new(&config.storage.database)
        .await
        .context("Failed to open database")?;
    debug!(path = %config.storage.database.display(), "Opened record store");
    Ok(Arc::new(SqliteRecordStore::new(pool.pool().clone())))
}

/// Loads the persisted session, if the device is logged in
pub(crate) fn load_session() -> Option<Session> {
    Session::load(&Session::default_path()).ok()
}

/// Runs a sync pass right after a local mutation
///
/// The mutation is already durable in the store, so every failure here
/// is non-fatal: offline simply means the record stays pending.
pub(crate) async fn sync_after_mutation(
    config: &Config,
    store: Arc<SqliteRecordStore>,
    formatter: &dyn OutputFormatter,
) {
    if !config.sync.sync_on_mutation {
        return;
    }
    let Some(session) = load_session() else {
        formatter.info("Not logged in; changes are kept locally until 'larder login'.");
        return;
    };

    let remote = Arc::new(HttpRemoteService::from_session(
        &config.server.base_url,
        &session,
    ));
    let engine = SyncEngine::new(store, remote);

    match engine.sync().await {
        Ok(summary) => {
            info!(
                pushed = summary.pushed,
                deferred = summary.deferred,
                "Post-mutation sync pass"
            );
            if summary.deferred > 0 {
                formatter.info("Server unreachable; changes will sync later.");
            }
            if summary.rejected > 0 {
                formatter.warn("The server rejected a change; see 'larder status'.");
            }
        }
        Err(SyncError::AuthRequired) => {
            formatter.warn("Session expired; run 'larder login' to resume syncing.");
        }
        Err(e) => warn!(error = %e, "Post-mutation sync failed"),
    }
}

/// Finds an active ingredient by local id or (case-insensitive) name
pub(crate) async fn find_ingredient(
    store: &SqliteRecordStore,
    query: &str,
) -> Result<Option<Ingredient>> {
    let all = store.fetch_all_ingredients().await?;
    let lowered = query.to_lowercase();

    Ok(all.into_iter().find(|record| {
        record.local_id().to_string() == query || record.name().to_lowercase() == lowered
    }))
}
