use killfeed_core::conf::{RuntimeConfig, load_config};
use killfeed_core::ingest::IngestController;
use killfeed_core::remote::LocalConnector;
use killfeed_core::store::FileStore;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const DEFAULT_ENTRYPOINT: &str = r#"
engine {
  lookback_days = 1
  backfill_days = 30
}

store {
  path = "state/killfeed.json"
}

transport {
  local_root = "mirror"
}
"#;

/// One line of a kill log.
pub fn kill_line(
    timestamp: &str,
    killer: (&str, &str),
    victim: (&str, &str),
    weapon: &str,
    distance: f64,
) -> String {
    format!(
        "{timestamp};{};{};{};{};{weapon};{distance};PC;PC\n",
        killer.0, killer.1, victim.0, victim.1
    )
}

/// A config directory with a mirrored server tree under `mirror/<server id>`.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_entrypoint(DEFAULT_ENTRYPOINT)
    }

    pub fn with_entrypoint(hcl: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("killfeed.hcl"), hcl).unwrap();
        fs::create_dir_all(dir.path().join("servers")).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Add a servers file with one server rooted at `/deathlogs`.
    pub fn add_server(&self, id: &str, hostname: Option<&str>) -> &Self {
        let hostname = hostname
            .map(|h| format!("    hostname = \"{h}\"\n"))
            .unwrap_or_default();
        let hcl = format!(
            "servers = [\n  {{\n    id = \"{id}\"\n{hostname}    roots = [\"/deathlogs\"]\n  }},\n]\n"
        );
        let file = format!("servers/{}.hcl", id.replace(|c: char| !c.is_alphanumeric(), "_"));
        fs::write(self.root().join(file), hcl).unwrap();
        fs::create_dir_all(self.mirror(id).join("deathlogs")).unwrap();
        self
    }

    pub fn mirror(&self, server_id: &str) -> PathBuf {
        self.root().join("mirror").join(server_id)
    }

    pub fn write_log(&self, server_id: &str, rel: &str, contents: &str) {
        let path = self.mirror(server_id).join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    pub fn append_log(&self, server_id: &str, rel: &str, contents: &str) {
        let mut file = OpenOptions::new()
            .append(true)
            .open(self.mirror(server_id).join(rel))
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    pub fn config(&self) -> RuntimeConfig {
        load_config(self.root()).unwrap().config
    }

    pub async fn store(&self) -> Arc<FileStore> {
        Arc::new(FileStore::open(self.config().store.path).await.unwrap())
    }

    /// A controller over a freshly opened store, as a new process would build it.
    pub async fn controller(&self) -> (RuntimeConfig, Arc<FileStore>, IngestController) {
        let cfg = self.config();
        let store = self.store().await;
        let connector = Arc::new(LocalConnector::new(cfg.transport.local_root.clone()));
        let controller = IngestController::new(store.clone(), connector, &cfg).unwrap();
        (cfg, store, controller)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
