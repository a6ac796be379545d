//! Watch command - run the periodic sync trigger in the foreground
//!
//! Subscribes to the trigger's event channel and prints a line per
//! pass, so the terminal shows the device converging as records sync.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tracing::info;

use larder_api::HttpRemoteService;
use larder_core::config::Config;
use larder_sync::{SyncEngine, SyncEvent, SyncTrigger};

use crate::commands::{load_session, open_store};
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Seconds between passes (defaults to sync.interval from config)
    #[arg(long)]
    pub interval: Option<u64>,
}

impl WatchCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));

        let config = Config::load_or_default(&Config::default_path());
        let Some(session) = load_session() else {
            formatter.error("Not logged in. Run 'larder login <email>' first.");
            return Ok(());
        };

        let interval = Duration::from_secs(self.interval.unwrap_or(config.sync.interval));
        info!(interval_secs = interval.as_secs(), "Starting watch mode");

        let store = open_store(&config).await?;
        let remote = Arc::new(HttpRemoteService::from_session(
            &config.server.base_url,
            &session,
        ));
        let engine = Arc::new(SyncEngine::new(store, remote));
        let trigger = Arc::new(SyncTrigger::new(engine));

        formatter.success(&format!(
            "Watching; syncing every {}s (Ctrl-C to stop)",
            interval.as_secs()
        ));

        let mut events = trigger.subscribe();
        let reporter = {
            let formatter = get_formatter(matches!(format, OutputFormat::Json));
            tokio::spawn(async move {
                while let Ok(event) = events.recv().await {
                    match event {
                        SyncEvent::Completed(summary) => {
                            let total = summary.pushed + summary.deleted + summary.pulled;
                            if total > 0 || summary.rejected > 0 {
                                formatter.info(&format!(
                                    "synced: {} pushed, {} pulled, {} deleted, {} rejected",
                                    summary.pushed,
                                    summary.pulled,
                                    summary.deleted,
                                    summary.rejected
                                ));
                            }
                        }
                        SyncEvent::AuthRequired => {
                            formatter.warn("Session expired; run 'larder login' to resume.");
                        }
                        SyncEvent::Failed(reason) => {
                            formatter.warn(&format!("Sync pass failed: {}", reason));
                        }
                    }
                }
            })
        };

        tokio::select! {
            _ = trigger.run(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping watch mode");
            }
        }

        reporter.abort();
        Ok(())
    }
}
