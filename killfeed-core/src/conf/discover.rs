use crate::conf::error::ConfigError;
use glob::glob;
use std::path::{Path, PathBuf};

/// Server files matched by `include.servers`, in sorted order.
///
/// Directories are skipped, and so are hidden files such as editor swap
/// files, so a half-saved `.eu.hcl` never becomes a second copy of a server.
pub fn discover(root: &Path, glob_pattern: &str) -> Result<Vec<PathBuf>, ConfigError> {
    let pattern = resolve_glob(root, glob_pattern);
    let entries = glob(&pattern).map_err(|source| ConfigError::Glob {
        pattern: pattern.clone(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() && !is_hidden(&path) => paths.push(path),
            Ok(_) => {}
            Err(e) => tracing::debug!(path = %e.path().display(), error = %e, "unreadable config path skipped"),
        }
    }

    paths.sort();
    Ok(paths)
}

/// Resolves a glob pattern relative to a root directory.
pub fn resolve_glob(root: &Path, pattern: &str) -> String {
    root.join(pattern).to_string_lossy().into_owned()
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}
