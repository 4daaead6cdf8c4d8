//! Gitignore-style ignore rules loaded from a single file (`.bgignore`).

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Compiled ignore rules, matched against paths relative to the notes root.
pub struct IgnoreRules {
    matcher: Gitignore,
    pattern_count: usize,
}

impl IgnoreRules {
    /// Rules that ignore nothing.
    pub fn empty() -> Self {
        Self { matcher: Gitignore::empty(), pattern_count: 0 }
    }

    /// Load rules from `ignore_file`.
    ///
    /// A missing or unreadable file yields an empty rule set with a warning;
    /// individual invalid patterns are skipped with a warning.
    pub fn load(root: &Path, ignore_file: &Path) -> Self {
        let content = match std::fs::read_to_string(ignore_file) {
            Ok(content) => content,
            Err(e) => {
                if ignore_file.exists() {
                    tracing::warn!(
                        "Failed to read ignore file {}: {}; continuing without ignore rules",
                        ignore_file.display(),
                        e
                    );
                } else {
                    tracing::warn!(
                        "Ignore file {} not found; continuing without ignore rules",
                        ignore_file.display()
                    );
                }
                return Self::empty();
            }
        };
        Self::from_lines(root, content.lines())
    }

    pub fn from_lines<'a>(root: &Path, lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut builder = GitignoreBuilder::new(root);
        let mut pattern_count = 0usize;
        for line in lines {
            let trimmed = line.trim_end();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match builder.add_line(None, trimmed) {
                Ok(_) => pattern_count += 1,
                Err(e) => tracing::warn!("Skipping invalid ignore pattern '{}': {}", trimmed, e),
            }
        }
        match builder.build() {
            Ok(matcher) => Self { matcher, pattern_count },
            Err(e) => {
                tracing::warn!("Failed to compile ignore rules: {}; continuing without them", e);
                Self::empty()
            }
        }
    }

    /// Whether the POSIX relative path is excluded.
    pub fn is_ignored(&self, rel_path: &str, is_dir: bool) -> bool {
        self.matcher.matched(Path::new(rel_path), is_dir).is_ignore()
    }

    pub fn len(&self) -> usize {
        self.pattern_count
    }

    pub fn is_empty(&self) -> bool {
        self.pattern_count == 0
    }
}
