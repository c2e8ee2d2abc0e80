use crate::conf::types::{RuntimeConfig, ServerConfig};
use crate::ingest::{IngestController, IngestError, IngestMode};
use crate::remote::{Connector, DirEntry, FileStat, LocalConnector, RemoteFs, TransportError};
use crate::store::{
    Document, DocumentStore, Filter, MemoryStore, PLAYERS, RIVALRIES, StoreError, Update,
    WriteOp,
};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::{TempDir, tempdir};
use tokio::sync::watch;

const FILE: &str = "deathlogs/world_0/2025.05.09-11.00.00.csv";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 9, 18, 0, 0).unwrap()
}

fn line(minute: u32, killer: &str, victim: &str) -> String {
    format!("2025.05.09-11.{minute:02}.00;K{killer};{killer};V{victim};{victim};M4;10;PC;PC\n")
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn server(root: &Path) -> ServerConfig {
    ServerConfig::new("7020", vec!["/deathlogs".to_string()]).with_local_root(root)
}

fn controller(store: Arc<dyn DocumentStore>) -> IngestController {
    IngestController::new(store, Arc::new(LocalConnector::default()), &RuntimeConfig::default())
        .unwrap()
}

fn setup() -> (TempDir, Arc<MemoryStore>, IngestController) {
    let dir = tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let controller = controller(store.clone());
    (dir, store, controller)
}

#[tokio::test]
async fn first_run_backfills_and_flips_mode() {
    // Arrange
    let (dir, _, controller) = setup();
    write(dir.path(), FILE, &(line(1, "1", "2") + &line(2, "2", "1")));
    let (_tx, cancel) = watch::channel(false);

    // Act
    let first = controller.run_server(&server(dir.path()), None, now(), &cancel).await.unwrap();
    let second = controller.run_server(&server(dir.path()), None, now(), &cancel).await.unwrap();

    // Assert
    assert_eq!(first.mode, IngestMode::HistoricalBackfill);
    assert!(first.backfill_completed);
    assert_eq!(first.files_discovered, 1);
    assert_eq!(first.files_processed, 1);
    assert_eq!(first.events_imported, 2);

    assert_eq!(second.mode, IngestMode::IncrementalTail);
    assert!(!second.backfill_completed);
    assert_eq!(second.files_processed, 1);
    assert_eq!(second.events_imported, 0);
}

#[tokio::test]
async fn files_outside_the_window_are_ignored() {
    // Arrange
    let (dir, _, controller) = setup();
    write(dir.path(), FILE, &line(1, "1", "2"));
    write(
        dir.path(),
        "deathlogs/2025.05.01-11.00.00.csv",
        &line(1, "3", "4"),
    );
    let (_tx, cancel) = watch::channel(false);

    // Act
    let report = controller
        .run_server(&server(dir.path()), Some(IngestMode::IncrementalTail), now(), &cancel)
        .await
        .unwrap();

    // Assert
    assert_eq!(report.files_discovered, 2);
    assert_eq!(report.files_in_window, 1);
    assert_eq!(report.events_imported, 1);
}

#[tokio::test]
async fn newest_file_keeps_its_partial_line() {
    // Arrange
    let (dir, _, controller) = setup();
    let complete = line(1, "1", "2");
    write(dir.path(), FILE, &format!("{complete}2025.05.09-11.02.00;K1;1;V2"));
    let (_tx, cancel) = watch::channel(false);

    // Act
    let report = controller
        .run_server(&server(dir.path()), Some(IngestMode::IncrementalTail), now(), &cancel)
        .await
        .unwrap();

    // Assert
    assert_eq!(report.events_imported, 1);
    assert_eq!(report.lines_skipped, 0);
    let offset = controller
        .tracker()
        .get_cursor("7020", &format!("/{FILE}"))
        .await
        .unwrap();
    assert_eq!(offset, complete.len() as u64);
}

#[tokio::test]
async fn shrunken_file_is_deferred_without_rewinding() {
    // Arrange
    let (dir, _, controller) = setup();
    write(dir.path(), FILE, &(line(1, "1", "2") + &line(2, "1", "2")));
    let (_tx, cancel) = watch::channel(false);
    let mode = Some(IngestMode::IncrementalTail);
    controller.run_server(&server(dir.path()), mode, now(), &cancel).await.unwrap();
    write(dir.path(), FILE, &line(3, "1", "2"));

    // Act
    let report = controller.run_server(&server(dir.path()), mode, now(), &cancel).await.unwrap();

    // Assert
    assert_eq!(report.deferred.len(), 1);
    assert!(!report.deferred[0].retryable);
    assert_eq!(report.files_processed, 0);
    let offset = controller.tracker().get_cursor("7020", &format!("/{FILE}")).await.unwrap();
    assert_eq!(offset, 2 * line(1, "1", "2").len() as u64);
}

#[tokio::test]
async fn cancellation_stops_before_the_next_file() {
    // Arrange
    let (dir, store, controller) = setup();
    write(dir.path(), FILE, &line(1, "1", "2"));
    let (tx, cancel) = watch::channel(false);
    tx.send(true).unwrap();

    // Act
    let report = controller.run_server(&server(dir.path()), None, now(), &cancel).await.unwrap();

    // Assert
    assert!(report.cancelled);
    assert!(!report.backfill_completed);
    assert_eq!(report.files_processed, 0);
    assert!(store.find(PLAYERS, &Filter::all()).await.unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_host_fails_the_run() {
    // Arrange
    let (dir, _, controller) = setup();
    let missing = ServerConfig::new("7020", vec!["/deathlogs".to_string()])
        .with_local_root(dir.path().join("not-mounted"));
    let (_tx, cancel) = watch::channel(false);

    // Act
    let result = controller.run_server(&missing, None, now(), &cancel).await;

    // Assert
    match result {
        Err(e @ IngestError::Transport { .. }) => assert!(e.is_retryable()),
        other => panic!("expected transport error, got {other:?}"),
    }
}

/// Delegates to a [`MemoryStore`] but can be switched to fail.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    down: AtomicBool,
    fail_players: AtomicBool,
    fail_rivalries: AtomicBool,
}

impl FlakyStore {
    fn check(&self, collection: &str) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("store is down"));
        }
        let failing = (collection == PLAYERS && self.fail_players.load(Ordering::SeqCst))
            || (collection == RIVALRIES && self.fail_rivalries.load(Ordering::SeqCst));
        if failing {
            return Err(StoreError::Write {
                path: collection.into(),
                source: std::io::Error::other("disk full"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check("")
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get(collection, key).await
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<(String, Document)>, StoreError> {
        self.inner.find(collection, filter).await
    }

    async fn upsert(&self, collection: &str, key: &str, update: &Update) -> Result<(), StoreError> {
        self.check(collection)?;
        self.inner.upsert(collection, key, update).await
    }

    async fn apply_batch(&self, writes: &[WriteOp]) -> Result<(), StoreError> {
        for write in writes {
            self.check(&write.collection)?;
        }
        self.inner.apply_batch(writes).await
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        set: &Document,
    ) -> Result<usize, StoreError> {
        self.check(collection)?;
        self.inner.update_many(collection, filter, set).await
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<usize, StoreError> {
        self.check(collection)?;
        self.inner.delete_many(collection, filter).await
    }
}

#[tokio::test]
async fn aggregation_failure_leaves_cursor_for_retry() {
    // Arrange
    let dir = tempdir().unwrap();
    write(dir.path(), FILE, &line(1, "1", "2"));
    let store = Arc::new(FlakyStore::default());
    let controller = controller(store.clone());
    let (_tx, cancel) = watch::channel(false);
    let mode = Some(IngestMode::IncrementalTail);
    store.fail_players.store(true, Ordering::SeqCst);

    // Act
    let failed = controller.run_server(&server(dir.path()), mode, now(), &cancel).await.unwrap();
    store.fail_players.store(false, Ordering::SeqCst);
    let retried = controller.run_server(&server(dir.path()), mode, now(), &cancel).await.unwrap();

    // Assert
    assert_eq!(failed.deferred.len(), 1);
    assert!(failed.deferred[0].retryable);
    assert_eq!(failed.events_imported, 0);
    assert_eq!(retried.events_imported, 1);
    let killer = controller.aggregator().player("7020", "1").await.unwrap().unwrap();
    assert_eq!(killer.kills, 1);
}

#[tokio::test]
async fn unavailable_store_aborts_before_reading() {
    // Arrange
    let dir = tempdir().unwrap();
    write(dir.path(), FILE, &line(1, "1", "2"));
    let store = Arc::new(FlakyStore::default());
    store.down.store(true, Ordering::SeqCst);
    let controller = controller(store.clone());
    let (_tx, cancel) = watch::channel(false);

    // Act
    let result = controller.run_server(&server(dir.path()), None, now(), &cancel).await;

    // Assert
    match result {
        Err(e @ IngestError::StoreUnavailable { .. }) => assert!(!e.is_retryable()),
        other => panic!("expected store unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_rivalry_write_does_not_double_count_players_on_retry() {
    // Arrange
    let dir = tempdir().unwrap();
    write(dir.path(), FILE, &line(1, "1", "2"));
    let store = Arc::new(FlakyStore::default());
    let controller = controller(store.clone());
    let (_tx, cancel) = watch::channel(false);
    let mode = Some(IngestMode::IncrementalTail);
    store.fail_rivalries.store(true, Ordering::SeqCst);

    // Act
    let failed = controller.run_server(&server(dir.path()), mode, now(), &cancel).await.unwrap();
    store.fail_rivalries.store(false, Ordering::SeqCst);
    let retried = controller.run_server(&server(dir.path()), mode, now(), &cancel).await.unwrap();

    // Assert
    assert_eq!(failed.deferred.len(), 1);
    assert_eq!(retried.events_imported, 1);
    let killer = controller.aggregator().player("7020", "1").await.unwrap().unwrap();
    let victim = controller.aggregator().player("7020", "2").await.unwrap().unwrap();
    assert_eq!(killer.kills, 1);
    assert_eq!(victim.deaths, 1);
    let rivalry = controller.aggregator().rivalry("7020", "1", "2").await.unwrap().unwrap();
    assert_eq!(rivalry.kills_by("1"), 1);
}

#[tokio::test]
async fn every_map_keeps_the_partial_line_of_its_live_file() {
    // Arrange
    let (dir, _, controller) = setup();
    let world_0 = "deathlogs/world_0/2025.05.09-11.00.00.csv";
    let world_1 = "deathlogs/world_1/2025.05.09-10.00.00.csv";
    let partial = "2025.05.09-11.10.00;K1;1;V2";
    let rest = ";2;M4;10;PC;PC\n";
    write(dir.path(), world_0, &format!("{}{partial}", line(1, "1", "2")));
    write(dir.path(), world_1, &format!("{}{partial}", line(2, "3", "4")));
    let (_tx, cancel) = watch::channel(false);
    let mode = Some(IngestMode::IncrementalTail);

    // Act
    let first = controller.run_server(&server(dir.path()), mode, now(), &cancel).await.unwrap();
    for file in [world_0, world_1] {
        let path = dir.path().join(file);
        let mut contents = fs::read_to_string(&path).unwrap();
        contents.push_str(rest);
        fs::write(&path, contents).unwrap();
    }
    let second = controller.run_server(&server(dir.path()), mode, now(), &cancel).await.unwrap();

    // Assert
    assert_eq!((first.events_imported, first.lines_skipped), (2, 0));
    assert_eq!((second.events_imported, second.lines_skipped), (2, 0));
}

#[tokio::test]
async fn older_file_in_the_same_map_is_read_to_the_end() {
    // Arrange
    let (dir, _, controller) = setup();
    let older = "deathlogs/world_0/2025.05.09-10.00.00.csv";
    write(dir.path(), older, &format!("{}junk-without-newline", line(1, "1", "2")));
    write(dir.path(), FILE, &line(2, "1", "2"));
    let (_tx, cancel) = watch::channel(false);

    // Act
    let report = controller
        .run_server(&server(dir.path()), Some(IngestMode::IncrementalTail), now(), &cancel)
        .await
        .unwrap();

    // Assert
    assert_eq!(report.events_imported, 2);
    assert_eq!(report.lines_skipped, 1);
}

/// Lists the real tree but reports one file as gone when it is opened.
struct VanishingConnector {
    gone: String,
}

struct VanishingFs {
    inner: Box<dyn RemoteFs>,
    gone: String,
}

#[async_trait]
impl Connector for VanishingConnector {
    async fn connect(&self, server: &ServerConfig) -> Result<Box<dyn RemoteFs>, TransportError> {
        Ok(Box::new(VanishingFs {
            inner: LocalConnector::default().connect(server).await?,
            gone: self.gone.clone(),
        }))
    }
}

#[async_trait]
impl RemoteFs for VanishingFs {
    async fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, TransportError> {
        self.inner.list_dir(path).await
    }

    async fn stat(&self, path: &str) -> Result<FileStat, TransportError> {
        if path == self.gone {
            return Err(TransportError::NotFound {
                path: path.to_string(),
            });
        }
        self.inner.stat(path).await
    }

    async fn read_range(&self, path: &str, offset: u64, len: u64) -> Result<Vec<u8>, TransportError> {
        self.inner.read_range(path, offset, len).await
    }
}

#[tokio::test]
async fn vanished_file_does_not_block_backfill_completion() {
    // Arrange
    let dir = tempdir().unwrap();
    let gone = "deathlogs/world_1/2025.05.09-10.00.00.csv";
    write(dir.path(), FILE, &line(1, "1", "2"));
    write(dir.path(), gone, &line(2, "1", "2"));
    let store = Arc::new(MemoryStore::new());
    let connector = Arc::new(VanishingConnector {
        gone: format!("/{gone}"),
    });
    let controller = IngestController::new(store, connector, &RuntimeConfig::default()).unwrap();
    let (_tx, cancel) = watch::channel(false);

    // Act
    let report = controller.run_server(&server(dir.path()), None, now(), &cancel).await.unwrap();

    // Assert
    assert_eq!(report.files_in_window, 2);
    assert_eq!(report.files_processed, 1);
    assert_eq!(report.files_vanished, 1);
    assert!(report.deferred.is_empty());
    assert!(report.backfill_completed);
}
