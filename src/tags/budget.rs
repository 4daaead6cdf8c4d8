//! Run-wide cap on distinct tags.

use std::collections::BTreeSet;

/// Distinct tags handed out so far, compared case-insensitively.
///
/// A tag already in the budget can be reused by any later article for free;
/// a new tag is only admitted while there is room.
#[derive(Debug, Clone, Default)]
pub struct TagBudget {
    used: BTreeSet<String>,
    capacity: usize,
}

impl TagBudget {
    pub fn new(capacity: usize) -> Self {
        Self { used: BTreeSet::new(), capacity }
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.used.contains(&tag.to_lowercase())
    }

    /// Register tags an article already carries. These count toward the
    /// budget but are never refused.
    pub fn seed<'a>(&mut self, tags: impl IntoIterator<Item = &'a String>) {
        for tag in tags {
            self.used.insert(tag.to_lowercase());
        }
    }

    /// Take up to `per_article` tags from ranked `candidates`.
    pub fn select(&mut self, candidates: &[String], per_article: usize) -> Vec<String> {
        let mut picked: Vec<String> = Vec::new();
        for candidate in candidates {
            if picked.len() >= per_article {
                break;
            }
            let key = candidate.to_lowercase();
            if picked.iter().any(|p| p.to_lowercase() == key) {
                continue;
            }
            if !self.used.contains(&key) {
                if self.used.len() >= self.capacity {
                    continue;
                }
                self.used.insert(key);
            }
            picked.push(candidate.clone());
        }
        picked
    }
}
