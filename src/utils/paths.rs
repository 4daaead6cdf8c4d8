//! Path normalization

use std::path::{Component, Path, PathBuf};

pub fn normalize_path(path: &str) -> String {
    // Convert backslashes to forward slashes and normalize
    path.replace('\\', "/")
}

/// Relative POSIX form of `path` under `root`, or `None` when outside it.
/// The root itself maps to `"."`.
pub fn relative_posix(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let joined = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    Some(if joined.is_empty() { ".".to_string() } else { joined })
}

/// Parent directory of a POSIX relative path, `"."` for top-level entries.
pub fn posix_parent(rel: &str) -> &str {
    match rel.rfind('/') {
        Some(idx) => &rel[..idx],
        None => ".",
    }
}

/// Join `rel` onto `base` and collapse `.` and `..` segments lexically.
///
/// `..` segments that would climb above `base`'s root are dropped.
pub fn join_posix_normalized(base: &str, rel: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    let base = if base == "." { "" } else { base };
    for segment in base.split('/').chain(rel.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Resolve `value` against `base` unless it is already absolute.
pub fn resolve_under(base: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        base.join(value)
    }
}
