//! Notes tree scanning with ignore rules and subtree counts

use anyhow::Result;
use std::path::Path;

pub mod ignore_rules;
pub mod scanner;
pub mod subtree;

pub use ignore_rules::IgnoreRules;
pub use scanner::{NotesScanner, ScanResult, ScanStats};
pub use subtree::SubtreeCounts;

/// Scan `root` with the rules in `ignore_file`.
pub fn scan_notes<P: AsRef<Path>>(root: P, ignore_file: &Path) -> Result<ScanResult> {
    let root = root.as_ref();
    let rules = IgnoreRules::load(root, ignore_file);
    NotesScanner::new(root.to_path_buf()).ignore_rules(rules).scan()
}
