use crate::cli::{connector, open_store};
use crate::conf::RuntimeConfig;
use crate::ingest::{IngestController, IngestMode, ServerRun, run_all};
use crate::store::DocumentStore;
use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::ValueEnum;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum ModeArg {
    /// Backfill until a backfill has completed, then tail
    #[default]
    Auto,
    Backfill,
    Tail,
}

impl ModeArg {
    pub fn forced(self) -> Option<IngestMode> {
        match self {
            ModeArg::Auto => None,
            ModeArg::Backfill => Some(IngestMode::HistoricalBackfill),
            ModeArg::Tail => Some(IngestMode::IncrementalTail),
        }
    }
}

/// Run ingestion for every configured server, or just `only`.
pub async fn run(
    cfg: RuntimeConfig,
    only: Option<String>,
    mode: ModeArg,
    cancel: watch::Receiver<bool>,
) -> Result<Vec<ServerRun>> {
    let servers = match &only {
        Some(id) => match cfg.server(id) {
            Some(server) => vec![server.clone()],
            None => bail!("server {id} is not configured"),
        },
        None => cfg.servers.clone(),
    };

    let store = open_store(&cfg).await?;
    store
        .ping()
        .await
        .context("document store unavailable at startup")?;

    let controller = IngestController::new(store, connector(&cfg), &cfg)?;
    let runs = run_all(Arc::new(controller), servers, mode.forced(), Utc::now(), cancel).await;

    for run in &runs {
        match &run.result {
            Ok(report) => println!(
                "{}",
                serde_json::json!({ "run_id": run.run_id.to_string(), "report": report })
            ),
            Err(e) => eprintln!("{} (run {}): {e}", run.server_id, run.run_id),
        }
    }

    Ok(runs)
}
