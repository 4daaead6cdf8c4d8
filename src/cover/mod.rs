//! Cover selection and the fallback cover pool.

use crate::utils::stable_index;
use std::path::{Path, PathBuf};

pub mod rename;

pub use rename::{run_rename, RenameOptions, RenamePlan};

/// Numbered fallback images `<url_dir>/cover-<i>.jpg`, `i` in `1..=size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverPool {
    pub url_dir: String,
    pub size: usize,
    /// Directory on disk holding the pool, when known.
    pub local_dir: Option<PathBuf>,
}

pub fn cover_file_name(index: usize) -> String {
    format!("cover-{index}.jpg")
}

impl CoverPool {
    pub fn new(url_dir: &str, size: usize, site_source: Option<&Path>) -> Self {
        let url_dir = url_dir.trim_end_matches('/').to_string();
        let local_dir = site_source.map(|source| source.join(url_dir.trim_start_matches('/')));
        Self { url_dir, size: size.max(1), local_dir }
    }

    pub fn url_for(&self, index: usize) -> String {
        format!("{}/{}", self.url_dir, cover_file_name(index))
    }

    fn wrap(&self, start: usize, offset: usize) -> usize {
        (start - 1 + offset) % self.size + 1
    }

    /// Deterministic fallback covers for `key`.
    ///
    /// Starts at the hashed index and takes consecutive indices. When the pool
    /// exists on disk, missing numbers are skipped by probing forward.
    pub fn fallback(&self, key: &str, count: usize) -> Vec<String> {
        let count = count.min(self.size);
        let start = stable_index(key, self.size);

        if let Some(dir) = self.local_dir.as_ref().filter(|d| d.is_dir()) {
            let present: Vec<usize> = (0..self.size)
                .map(|offset| self.wrap(start, offset))
                .filter(|i| dir.join(cover_file_name(*i)).is_file())
                .take(count)
                .collect();
            if !present.is_empty() {
                return present.into_iter().map(|i| self.url_for(i)).collect();
            }
            tracing::debug!("[cover] pool {} has no numbered covers", dir.display());
        }

        (0..count).map(|offset| self.url_for(self.wrap(start, offset))).collect()
    }
}

fn is_remote(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("//")
        || lower.starts_with("data:")
}

/// Whether a rewritten image URL can serve as a cover.
///
/// Site-absolute URLs must exist under `site_source` when it is known.
pub fn image_usable(url: &str, site_source: Option<&Path>) -> bool {
    if url.trim().is_empty() {
        return false;
    }
    if is_remote(url) {
        return true;
    }
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match (path.strip_prefix('/'), site_source) {
        (Some(rel), Some(source)) => source.join(rel).exists(),
        (Some(_), None) => true,
        // Still relative after rewriting: nothing to serve it from.
        (None, _) => false,
    }
}

/// Covers for one article: embedded images first, pool fallback otherwise.
pub fn choose_covers(
    images: &[String],
    count: usize,
    key: &str,
    pool: &CoverPool,
    site_source: Option<&Path>,
) -> Vec<String> {
    let count = count.max(1);
    let embedded: Vec<String> = images
        .iter()
        .filter(|url| image_usable(url, site_source))
        .take(count)
        .cloned()
        .collect();
    if !embedded.is_empty() {
        return embedded;
    }
    tracing::debug!("[cover] {} has no usable image, using pool", key);
    pool.fallback(key, count)
}
