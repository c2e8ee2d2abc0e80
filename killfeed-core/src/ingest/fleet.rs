use crate::conf::types::ServerConfig;
use crate::ingest::controller::IngestController;
use crate::ingest::error::IngestError;
use crate::ingest::mode::IngestMode;
use crate::ingest::report::RunReport;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::Instrument;
use uuid::Uuid;

/// Result of one server's run within [`run_all`].
#[derive(Debug)]
pub struct ServerRun {
    pub server_id: String,
    /// Correlates this run's log events.
    pub run_id: Uuid,
    pub result: Result<RunReport, IngestError>,
}

/// Run every server concurrently. Results come back in the order of `servers`.
///
/// Runs are independent: one server failing, or exhausting its host's
/// connection slots, has no effect on the others.
pub async fn run_all(
    controller: Arc<IngestController>,
    servers: Vec<ServerConfig>,
    mode: Option<IngestMode>,
    now: DateTime<Utc>,
    cancel: watch::Receiver<bool>,
) -> Vec<ServerRun> {
    let mut tasks = JoinSet::new();

    let run_ids: Vec<Uuid> = servers.iter().map(|_| Uuid::new_v4()).collect();

    for (index, server) in servers.iter().cloned().enumerate() {
        let controller = controller.clone();
        let cancel = cancel.clone();
        let span = tracing::info_span!("ingest", server = %server.id, run_id = %run_ids[index]);

        tasks.spawn(
            async move {
                let result = controller.run_server(&server, mode, now, &cancel).await;
                (index, result)
            }
            .instrument(span),
        );
    }

    let mut results: Vec<Option<Result<RunReport, IngestError>>> =
        servers.iter().map(|_| None).collect();

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => results[index] = Some(result),
            Err(e) => tracing::error!(error = %e, "ingestion task did not complete"),
        }
    }

    servers
        .into_iter()
        .zip(results)
        .zip(run_ids)
        .map(|((server, result), run_id)| {
            let result = result.unwrap_or_else(|| {
                Err(IngestError::Task {
                    server_id: server.id.clone(),
                    reason: "task panicked or was aborted".to_string(),
                })
            });
            if let Err(e) = &result {
                tracing::error!(
                    server = %server.id,
                    run_id = %run_id,
                    error = %e,
                    retryable = e.is_retryable(),
                    "ingestion run failed"
                );
            }
            ServerRun {
                server_id: server.id,
                run_id,
                result,
            }
        })
        .collect()
}
