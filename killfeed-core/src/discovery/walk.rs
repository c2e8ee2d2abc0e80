use crate::discovery::filename::parse_log_filename;
use crate::discovery::pattern::MapDirPattern;
use crate::remote::{EntryKind, RemoteFs, TransportError, join_path, normalize_path};
use chrono::{DateTime, Utc};
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    /// Normalized absolute remote path.
    pub path: String,
    pub server_id: String,
    pub timestamp: DateTime<Utc>,
    /// Size observed during this discovery pass.
    pub size: u64,
}

/// Enumerate log files under `roots`, oldest first.
///
/// Only directories matching `pattern` are entered, at most `max_depth` levels
/// below a root. Missing or unreadable directories contribute nothing;
/// connection failures abort the walk.
pub async fn discover(
    fs: &dyn RemoteFs,
    server_id: &str,
    roots: &[String],
    pattern: &MapDirPattern,
    max_depth: usize,
) -> Result<Vec<LogFile>, TransportError> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    let mut queue: VecDeque<(String, usize)> = roots
        .iter()
        .map(|root| (normalize_path(root), 0))
        .collect();

    while let Some((dir, depth)) = queue.pop_front() {
        let entries = match fs.list_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.is_connection_failure() => return Err(e),
            Err(e) => {
                if e.is_missing() {
                    tracing::debug!(server_id, path = %dir, "log directory not present");
                } else {
                    tracing::warn!(server_id, path = %dir, error = %e, "log directory unreadable");
                }
                continue;
            }
        };

        for entry in entries {
            match entry.kind {
                EntryKind::Directory if depth < max_depth && pattern.matches(&entry.name) => {
                    queue.push_back((join_path(&dir, &entry.name), depth + 1));
                }
                EntryKind::File => {
                    let Some(timestamp) = parse_log_filename(&entry.name) else {
                        continue;
                    };
                    let path = join_path(&dir, &entry.name);
                    if seen.insert(path.clone()) {
                        files.push(LogFile {
                            path,
                            server_id: server_id.to_string(),
                            timestamp,
                            size: entry.size,
                        });
                    }
                }
                _ => {}
            }
        }
    }

    files.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.path.cmp(&b.path)));

    tracing::debug!(server_id, files = files.len(), "discovery complete");
    Ok(files)
}
