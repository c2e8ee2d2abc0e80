/// Normalize a remote path so the same file always produces the same key.
///
/// Backslashes become `/`, repeated separators collapse, and a trailing
/// separator is dropped (except for the root itself).
pub fn normalize_path(path: &str) -> String {
    let replaced = path.replace('\\', "/");
    let absolute = replaced.starts_with('/');

    let joined = replaced
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");

    match (absolute, joined.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{joined}"),
        (false, _) => joined,
    }
}

/// Join a child name onto a remote directory path.
pub fn join_path(dir: &str, name: &str) -> String {
    normalize_path(&format!("{dir}/{name}"))
}
