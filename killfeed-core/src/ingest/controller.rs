use crate::aggregate::EventAggregator;
use crate::conf::types::{DiscoveryConfig, EngineConfig, RuntimeConfig, ServerConfig};
use crate::cursor::{PositionTracker, cursor_key};
use crate::discovery::{LogFile, MapDirPattern, discover};
use crate::identity::{
    IdentityHints, Provenance, ServerIdentity, SharedServerTable, builtin_known_servers, resolve,
};
use crate::ingest::error::{FileError, IngestError};
use crate::ingest::mode::IngestMode;
use crate::ingest::reader::{consumable_len, read_tail};
use crate::ingest::report::{DeferredFile, RunReport};
use crate::record::parse_batch;
use crate::remote::{Connector, HostLimiter, RemoteFs, TimeoutFs, TransportError, with_timeout};
use crate::store::{DocumentStore, SERVERS, Update};
use ahash::{AHashMap, AHashSet};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use futures_util::StreamExt;
use futures_util::stream;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, watch};

/// The newest file of every directory. Each map writes its own log, so each
/// of these may still be receiving its last line.
fn live_files(files: &[LogFile]) -> AHashSet<String> {
    let mut newest: AHashMap<&str, &LogFile> = AHashMap::new();
    for file in files {
        let dir = file.path.rsplit_once('/').map_or("", |(dir, _)| dir);
        newest
            .entry(dir)
            .and_modify(|current| {
                if (file.timestamp, &file.path) > (current.timestamp, &current.path) {
                    *current = file;
                }
            })
            .or_insert(file);
    }
    newest.into_values().map(|f| f.path.clone()).collect()
}

/// The unread tail of one file, read while holding the file's lock.
struct LoadedTail {
    file: LogFile,
    _lock: OwnedMutexGuard<()>,
    start: u64,
    end: u64,
    text: String,
}

pub struct IngestController {
    store: Arc<dyn DocumentStore>,
    connector: Arc<dyn Connector>,
    limiter: Arc<HostLimiter>,
    known: Arc<SharedServerTable>,
    engine: EngineConfig,
    discovery: DiscoveryConfig,
    pattern: MapDirPattern,
    tracker: PositionTracker,
    aggregator: EventAggregator,
    /// Held from reading a file's cursor until it is advanced.
    file_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl IngestController {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        connector: Arc<dyn Connector>,
        config: &RuntimeConfig,
    ) -> Result<Self, IngestError> {
        let known = builtin_known_servers().merged_with(&config.identity.known_servers);

        Ok(Self {
            tracker: PositionTracker::new(store.clone()),
            aggregator: EventAggregator::new(store.clone()),
            store,
            connector,
            limiter: Arc::new(HostLimiter::new(config.engine.connection_cap())),
            known: Arc::new(SharedServerTable::new(known)),
            engine: config.engine.clone(),
            pattern: MapDirPattern::from_config(&config.discovery)?,
            discovery: config.discovery.clone(),
            file_locks: DashMap::new(),
        })
    }

    /// Share a host limiter with other controllers.
    pub fn with_limiter(mut self, limiter: Arc<HostLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn known_servers(&self) -> &Arc<SharedServerTable> {
        &self.known
    }

    pub fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    pub fn aggregator(&self) -> &EventAggregator {
        &self.aggregator
    }

    pub fn identity(&self, server: &ServerConfig) -> ServerIdentity {
        let hints = IdentityHints {
            hostname: server.hostname.as_deref(),
            server_name: server.name.as_deref(),
            guild_id: server.guild_id.as_deref(),
        };
        resolve(&server.id, &hints, self.known.as_ref())
    }

    /// Run one server. `mode: None` picks the mode from the backfill marker.
    ///
    /// Per-file failures are reported in [`RunReport::deferred`]; only store
    /// unavailability and failure to reach the host abort the run.
    pub async fn run_server(
        &self,
        server: &ServerConfig,
        mode: Option<IngestMode>,
        now: DateTime<Utc>,
        cancel: &watch::Receiver<bool>,
    ) -> Result<RunReport, IngestError> {
        //---------------------------------------------------------------------
        // Preconditions
        //---------------------------------------------------------------------
        self.store
            .ping()
            .await
            .map_err(|source| IngestError::StoreUnavailable { source })?;

        let identity = self.identity(server);
        if identity.provenance == Provenance::Unresolved {
            tracing::warn!(raw_id = %identity.raw, "server id could not be resolved, using it as is");
        }
        let server_id = identity.canonical.clone();

        let mode = match mode {
            Some(mode) => mode,
            None => {
                let marker = self
                    .tracker
                    .backfill_marker(&server_id)
                    .await
                    .map_err(|source| self.store_error(&server_id, source))?;
                IngestMode::for_marker(&marker)
            }
        };

        let mut report = RunReport::new(
            server_id.clone(),
            identity.raw.clone(),
            identity.provenance,
            mode,
        );

        tracing::info!(server_id = %server_id, raw_id = %identity.raw, mode = %mode, "ingestion run started");

        //---------------------------------------------------------------------
        // Connect and discover
        //---------------------------------------------------------------------
        let _slot = self
            .limiter
            .acquire(server.host_label())
            .map_err(|source| self.transport_error(&server_id, source))?;

        let timeout = self.engine.io_timeout();
        let fs = with_timeout(timeout, "connect", self.connector.connect(server))
            .await
            .map_err(|source| self.transport_error(&server_id, source))?;
        let fs = TimeoutFs::new(fs, timeout);

        let discovered = discover(
            &fs,
            &server_id,
            &server.roots,
            &self.pattern,
            self.discovery.max_depth,
        )
        .await
        .map_err(|source| self.transport_error(&server_id, source))?;

        report.files_discovered = discovered.len();
        let live = live_files(&discovered);

        let days = match mode {
            IngestMode::HistoricalBackfill => self.engine.backfill_days,
            IngestMode::IncrementalTail => self.engine.lookback_days,
        };
        let cutoff = now - Duration::days(i64::from(days));
        let candidates: Vec<LogFile> = discovered
            .into_iter()
            .filter(|f| f.timestamp >= cutoff)
            .collect();
        report.files_in_window = candidates.len();

        tracing::info!(
            server_id = %server_id,
            discovered = report.files_discovered,
            in_window = report.files_in_window,
            days,
            "log files discovered"
        );

        //---------------------------------------------------------------------
        // Read concurrently, aggregate in chronological order
        //---------------------------------------------------------------------
        let loads = stream::iter(candidates)
            .map(|file| {
                let hold_partial = live.contains(file.path.as_str());
                self.load_tail(&fs, &server_id, file, hold_partial)
            })
            .buffered(self.engine.read_concurrency.max(1));
        futures_util::pin_mut!(loads);

        while let Some(loaded) = loads.next().await {
            if *cancel.borrow() {
                tracing::info!(server_id = %server_id, "cancellation requested, stopping between files");
                report.cancelled = true;
                break;
            }

            let tail = match loaded {
                Ok(Some(tail)) => tail,
                Ok(None) => {
                    report.files_vanished += 1;
                    continue;
                }
                Err((path, error)) => {
                    self.defer(&mut report, &path, error);
                    continue;
                }
            };

            let path = tail.file.path.clone();
            if let Err(error) = self.commit_tail(&mut report, &server_id, tail, now).await {
                self.defer(&mut report, &path, error);
            }
        }

        //---------------------------------------------------------------------
        // Backfill transition
        //---------------------------------------------------------------------
        if mode == IngestMode::HistoricalBackfill && report.is_complete() {
            match self.tracker.mark_backfill_complete(&server_id, now).await {
                Ok(()) => report.backfill_completed = true,
                Err(e) => {
                    tracing::error!(server_id = %server_id, error = %e, "failed to record backfill completion")
                }
            }
        }

        self.record_run(&identity, &report, now).await;

        tracing::info!(
            server_id = %server_id,
            mode = %mode,
            files_discovered = report.files_discovered,
            files_processed = report.files_processed,
            events = report.events_imported,
            skipped = report.lines_skipped,
            deferred = report.deferred.len(),
            cancelled = report.cancelled,
            "ingestion run finished"
        );

        Ok(report)
    }

    /// Lock the file, then read from its cursor to the consumable end.
    ///
    /// `Ok(None)` means the file vanished after discovery.
    async fn load_tail(
        &self,
        fs: &dyn RemoteFs,
        server_id: &str,
        file: LogFile,
        hold_partial: bool,
    ) -> Result<Option<LoadedTail>, (String, FileError)> {
        let lock = self
            .file_locks
            .entry(cursor_key(server_id, &file.path))
            .or_default()
            .clone();
        let guard = lock.lock_owned().await;

        let fail = |error: FileError| (file.path.clone(), error);

        let start = self
            .tracker
            .get_cursor(server_id, &file.path)
            .await
            .map_err(|e| fail(e.into()))?;

        let size = match fs.stat(&file.path).await {
            Ok(stat) => stat.size,
            Err(e) if e.is_missing() => {
                tracing::debug!(server_id, path = %file.path, "log file vanished before reading");
                return Ok(None);
            }
            Err(e) => return Err(fail(e.into())),
        };

        if size < start {
            return Err(fail(FileError::Truncated {
                size,
                cursor: start,
            }));
        }

        let bytes = read_tail(fs, &file.path, start, size, self.engine.read_chunk_bytes)
            .await
            .map_err(|e| fail(e.into()))?;
        let len = consumable_len(&bytes, hold_partial);
        let text = String::from_utf8_lossy(&bytes[..len]).into_owned();

        Ok(Some(LoadedTail {
            start,
            end: start + len as u64,
            text,
            file,
            _lock: guard,
        }))
    }

    /// Parse, aggregate, then advance. The lock in `tail` is released on return.
    async fn commit_tail(
        &self,
        report: &mut RunReport,
        server_id: &str,
        tail: LoadedTail,
        now: DateTime<Utc>,
    ) -> Result<(), FileError> {
        if tail.end == tail.start {
            tracing::debug!(server_id, path = %tail.file.path, offset = tail.start, "no new records");
            report.files_processed += 1;
            return Ok(());
        }

        let batch = parse_batch(&tail.text, self.engine.delimiter_char());
        if batch.skipped > 0 {
            tracing::warn!(
                server_id,
                path = %tail.file.path,
                skipped = batch.skipped,
                kinds = ?batch.errors_by_kind,
                "malformed records skipped"
            );
        }

        self.aggregator.apply(server_id, &batch.events).await?;
        self.tracker
            .advance_cursor(server_id, &tail.file.path, tail.end, now)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    server_id,
                    path = %tail.file.path,
                    error = %e,
                    "events aggregated but cursor not advanced"
                )
            })?;

        tracing::info!(
            server_id,
            path = %tail.file.path,
            offset = tail.end,
            events = batch.events.len(),
            skipped = batch.skipped,
            "log file ingested"
        );

        report.files_processed += 1;
        report.events_imported += batch.events.len();
        report.lines_skipped += batch.skipped;
        Ok(())
    }

    fn defer(&self, report: &mut RunReport, path: &str, error: FileError) {
        let deferred = DeferredFile::new(path, &error);
        tracing::warn!(
            server_id = %report.server_id,
            path,
            error = %error,
            retryable = deferred.retryable,
            "log file deferred"
        );
        report.deferred.push(deferred);
    }

    /// Keep the server document's identity and last-run fields current.
    async fn record_run(&self, identity: &ServerIdentity, report: &RunReport, now: DateTime<Utc>) {
        let update = Update::new()
            .set("server_id", identity.canonical.as_str())
            .set("raw_id", identity.raw.as_str())
            .set("provenance", identity.provenance.to_string())
            .set("last_run_at", now.to_rfc3339())
            .set("last_run_mode", report.mode.to_string())
            .set("last_run_events", report.events_imported)
            .set_on_insert("created_at", now.to_rfc3339());

        if let Err(e) = self.store.upsert(SERVERS, &identity.canonical, &update).await {
            tracing::warn!(server_id = %identity.canonical, error = %e, "failed to record run summary");
        }
    }

    fn transport_error(&self, server_id: &str, source: TransportError) -> IngestError {
        IngestError::Transport {
            server_id: server_id.to_string(),
            source,
        }
    }

    fn store_error(&self, server_id: &str, source: crate::store::StoreError) -> IngestError {
        IngestError::Store {
            server_id: server_id.to_string(),
            source,
        }
    }
}
