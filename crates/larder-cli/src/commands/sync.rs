//! Sync command - run one full sync pass
//!
//! Wires the store and remote adapters from config and session, runs
//! the engine once, and reports what the pass did.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::info;

use larder_api::HttpRemoteService;
use larder_core::config::Config;
use larder_sync::{SyncEngine, SyncError, SyncSummary};

use crate::commands::{load_session, open_store};
use crate::output::{get_formatter, OutputFormat, OutputFormatter};

#[derive(Debug, Args)]
pub struct SyncCommand {}

impl SyncCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));

        let config = Config::load_or_default(&Config::default_path());
        let Some(session) = load_session() else {
            formatter.error("Not logged in. Run 'larder login <email>' first.");
            return Ok(());
        };

        info!(family_id = %session.family_id, "Running sync pass");

        let store = open_store(&config).await?;
        let remote = Arc::new(HttpRemoteService::from_session(
            &config.server.base_url,
            &session,
        ));
        let engine = SyncEngine::new(store, remote);

        match engine.sync().await {
            Ok(summary) => display_summary(&summary, format, &*formatter),
            Err(SyncError::AuthRequired) => {
                formatter.error("Session expired. Run 'larder login' to continue syncing.");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }
}

fn display_summary(summary: &SyncSummary, format: OutputFormat, formatter: &dyn OutputFormatter) {
    if matches!(format, OutputFormat::Json) {
        formatter.print_json(&serde_json::json!({
            "pushed": summary.pushed,
            "deleted": summary.deleted,
            "pulled": summary.pulled,
            "rejected": summary.rejected,
            "deferred": summary.deferred,
            "errors": summary.errors,
            "duration_ms": summary.duration_ms,
        }));
        return;
    }

    let duration = if summary.duration_ms >= 1000 {
        format!("{:.1}s", summary.duration_ms as f64 / 1000.0)
    } else {
        format!("{}ms", summary.duration_ms)
    };

    let total = summary.pushed + summary.deleted + summary.pulled;
    if total == 0 && summary.rejected == 0 && summary.deferred == 0 && summary.errors.is_empty() {
        formatter.success("Already up to date");
        return;
    }

    formatter.success(&format!("Sync finished in {}", duration));
    if summary.pushed > 0 {
        formatter.info(&format!("Pushed:   {}", summary.pushed));
    }
    if summary.pulled > 0 {
        formatter.info(&format!("Pulled:   {}", summary.pulled));
    }
    if summary.deleted > 0 {
        formatter.info(&format!("Deleted:  {}", summary.deleted));
    }
    if summary.deferred > 0 {
        formatter.info(&format!(
            "Deferred: {} (server unreachable, retried next pass)",
            summary.deferred
        ));
    }
    if summary.rejected > 0 {
        formatter.warn(&format!(
            "{} record(s) rejected by the server; see 'larder status'",
            summary.rejected
        ));
    }
    if !summary.errors.is_empty() {
        formatter.warn(&format!("{} error(s) during the pass:", summary.errors.len()));
        for err in &summary.errors {
            formatter.info(&format!("- {}", err));
        }
    }
}
