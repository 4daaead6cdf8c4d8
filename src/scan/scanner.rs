//! Notes tree scanner with ignore-rule support

use crate::domain::{is_image, is_markdown};
use crate::error::PipelineError;
use crate::scan::ignore_rules::IgnoreRules;
use crate::utils::relative_posix;
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Everything the sync planner needs to know about the notes tree.
///
/// All paths are POSIX-style and relative to the scanned root; the root
/// directory itself is `"."`.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub markdown: Vec<String>,
    pub images: Vec<String>,
    /// Markdown files directly inside each directory (not recursive).
    pub local_md_counts: BTreeMap<String, usize>,
    pub directories: BTreeSet<String>,
    pub stats: ScanStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub files_seen: usize,
    pub files_ignored: usize,
    pub dirs_pruned: usize,
    pub other_files: usize,
}

/// Walks a notes tree, classifying files as Markdown or image.
pub struct NotesScanner {
    root_path: PathBuf,
    rules: IgnoreRules,
}

impl NotesScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path, rules: IgnoreRules::empty() }
    }

    /// Set the ignore rules applied during the walk
    pub fn ignore_rules(mut self, rules: IgnoreRules) -> Self {
        self.rules = rules;
        self
    }

    /// Scan the tree. Ignored directories are pruned, so nothing below them
    /// is visited. Output lists are sorted by relative path.
    ///
    /// An unreadable entry fails the scan instead of dropping its subtree.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.is_dir() {
            return Err(PipelineError::MissingSource(self.root_path.clone()).into());
        }

        let mut result = ScanResult::default();
        result.directories.insert(".".to_string());

        let root = self.root_path.as_path();
        let rules = &self.rules;
        let mut pruned = 0usize;

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let is_dir = entry.file_type().is_dir();
                if is_dir && entry.file_name() == ".git" {
                    return false;
                }
                let Some(rel) = relative_posix(root, entry.path()) else {
                    return false;
                };
                if rules.is_ignored(&rel, is_dir) {
                    if is_dir {
                        tracing::debug!("[ignore] prune dir {}", rel);
                        pruned += 1;
                    } else {
                        tracing::debug!("[ignore] {}", rel);
                        result.stats.files_ignored += 1;
                    }
                    return false;
                }
                true
            });

        let mut entries = Vec::new();
        for entry_result in walker {
            let entry = entry_result
                .with_context(|| format!("Failed walking notes tree {}", root.display()))?;
            entries.push(entry);
        }

        for entry in entries {
            let Some(rel) = relative_posix(root, entry.path()) else {
                continue;
            };
            if entry.file_type().is_dir() {
                result.directories.insert(rel);
                continue;
            }

            result.stats.files_seen += 1;
            let path = entry.path();
            if is_markdown(path) {
                let parent = crate::utils::posix_parent(&rel).to_string();
                *result.local_md_counts.entry(parent).or_insert(0) += 1;
                result.markdown.push(rel);
            } else if is_image(path) {
                result.images.push(rel);
            } else {
                result.stats.other_files += 1;
            }
        }
        result.stats.dirs_pruned = pruned;

        result.markdown.sort();
        result.images.sort();

        tracing::debug!(
            "[scan] markdown files found (after ignore): {}, images: {}",
            result.markdown.len(),
            result.images.len()
        );
        Ok(result)
    }
}
