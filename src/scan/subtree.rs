//! Recursive Markdown counts per directory subtree.

use std::collections::{BTreeMap, BTreeSet};

use crate::utils::posix_parent;

/// Directory -> number of Markdown files in that directory and all of its
/// descendants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtreeCounts {
    counts: BTreeMap<String, usize>,
}

impl SubtreeCounts {
    /// Fold local counts upward, deepest directories first.
    pub fn compute(local: &BTreeMap<String, usize>, directories: &BTreeSet<String>) -> Self {
        let mut counts: BTreeMap<String, usize> =
            directories.iter().map(|d| (d.clone(), local.get(d).copied().unwrap_or(0))).collect();
        // Local counts can mention directories missing from the visited set.
        for (dir, n) in local {
            counts.entry(dir.clone()).or_insert(*n);
        }

        let mut ordered: Vec<String> = counts.keys().filter(|d| *d != ".").cloned().collect();
        ordered.sort_by_key(|d| std::cmp::Reverse(depth(d)));

        for dir in ordered {
            let own = counts.get(&dir).copied().unwrap_or(0);
            let parent = posix_parent(&dir).to_string();
            *counts.entry(parent).or_insert(0) += own;
        }

        Self { counts }
    }

    pub fn get(&self, dir: &str) -> usize {
        self.counts.get(dir).copied().unwrap_or(0)
    }

    /// Whether a Markdown file directly inside `dir` is admitted.
    pub fn admits(&self, dir: &str, min_md: usize) -> bool {
        self.get(dir) >= min_md
    }

    /// Directories whose subtree falls below the threshold.
    pub fn below(&self, min_md: usize) -> Vec<&str> {
        self.counts.iter().filter(|(_, c)| **c < min_md).map(|(d, _)| d.as_str()).collect()
    }
}

fn depth(dir: &str) -> usize {
    if dir == "." {
        0
    } else {
        dir.split('/').count()
    }
}
