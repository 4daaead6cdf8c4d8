//! Hexo site detection

use std::path::{Path, PathBuf};

const SITE_MARKERS: &[&str] = &["_config.yml", "package.json"];

fn is_site_root(dir: &Path) -> bool {
    SITE_MARKERS.iter().all(|m| dir.join(m).is_file())
}

/// Walk up from `start` looking for a Hexo site root (a directory holding
/// both `_config.yml` and `package.json`).
pub fn find_site_root(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    let mut current = Some(start.as_path());
    while let Some(dir) = current {
        if is_site_root(dir) {
            tracing::debug!("[site] root {} (from {})", dir.display(), start.display());
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

/// The site's `source/` directory, if it exists.
pub fn site_source_for(start: &Path) -> Option<PathBuf> {
    find_site_root(start).map(|root| root.join("source")).filter(|s| s.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn finds_ancestor_with_markers() {
        let temp = TempDir::new().expect("tmp");
        let root = temp.path().canonicalize().unwrap();
        fs::write(root.join("_config.yml"), "title: x\n").unwrap();
        fs::write(root.join("package.json"), "{}").unwrap();
        let posts = root.join("source").join("_posts");
        fs::create_dir_all(&posts).unwrap();

        assert_eq!(find_site_root(&posts), Some(root.clone()));
        assert_eq!(site_source_for(&posts), Some(root.join("source")));
    }

    #[test]
    fn needs_both_markers() {
        let temp = TempDir::new().expect("tmp");
        let dir = temp.path().join("blog");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("_config.yml"), "title: x\n").unwrap();
        assert_eq!(find_site_root(&dir), None);
    }
}
