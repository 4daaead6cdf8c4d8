//! Copy planning: which files go where.

use crate::domain::SyncOptions;
use crate::scan::{ScanResult, SubtreeCounts};
use crate::utils::posix_parent;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCopy {
    pub relative: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    pub markdown: Vec<PlannedCopy>,
    pub images: Vec<PlannedCopy>,
    pub skipped_markdown: Vec<String>,
}

impl SyncPlan {
    /// Build the plan from a finished scan.
    ///
    /// A Markdown file is admitted when the subtree rooted at its parent
    /// directory holds at least `min_md` Markdown files. Images are always
    /// admitted so admitted articles never point at missing files.
    pub fn build(scan: &ScanResult, options: &SyncOptions) -> Self {
        let counts = SubtreeCounts::compute(&scan.local_md_counts, &scan.directories);
        let min_md = options.min_md.max(1);

        let below = counts.below(min_md);
        if !below.is_empty() {
            tracing::debug!("[rule] skip subtree (<{} md): {} dirs", min_md, below.len());
        }

        let mut plan = SyncPlan::default();
        for rel in &scan.markdown {
            let parent = posix_parent(rel);
            if !counts.admits(parent, min_md) {
                tracing::debug!("[skip] {} (dir subtree md < {})", rel, min_md);
                plan.skipped_markdown.push(rel.clone());
                continue;
            }
            plan.markdown.push(PlannedCopy {
                relative: rel.clone(),
                source: options.notes_dir.join(rel),
                destination: options.target_dir.join(rel),
            });
        }

        for rel in &scan.images {
            plan.images.push(PlannedCopy {
                relative: rel.clone(),
                source: options.notes_dir.join(rel),
                destination: options.image_target_dir.join(rel),
            });
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::NotesScanner;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn options(root: &Path, min_md: usize) -> SyncOptions {
        SyncOptions {
            repo_root: root.to_path_buf(),
            notes_dir: root.join("notes"),
            target_dir: root.join("out/_posts"),
            image_target_dir: root.join("out/note_image"),
            ignore_file: root.join(".bgignore"),
            min_md,
            dry_run: false,
            delete_before_sync: false,
            post_process: false,
        }
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "# x\n").unwrap();
    }

    fn plan_for(tmp: &TempDir, min_md: usize) -> SyncPlan {
        let opts = options(tmp.path(), min_md);
        let scan = NotesScanner::new(opts.notes_dir.clone()).scan().unwrap();
        SyncPlan::build(&scan, &opts)
    }

    fn rels(copies: &[PlannedCopy]) -> Vec<&str> {
        copies.iter().map(|c| c.relative.as_str()).collect()
    }

    #[test]
    fn cluster_of_three_is_admitted() {
        let tmp = TempDir::new().unwrap();
        for name in ["a", "b", "c"] {
            touch(tmp.path(), &format!("notes/Java/{name}.md"));
        }
        let plan = plan_for(&tmp, 2);
        assert_eq!(rels(&plan.markdown), vec!["Java/a.md", "Java/b.md", "Java/c.md"]);
        assert!(plan.images.is_empty());
        assert_eq!(
            plan.markdown[0].destination,
            tmp.path().join("out/_posts").join("Java/a.md")
        );
    }

    #[test]
    fn lone_note_is_skipped_but_its_image_is_copied() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "notes/Scratch/only.md");
        touch(tmp.path(), "notes/Scratch/img/pic.png");
        let plan = plan_for(&tmp, 2);
        assert!(plan.markdown.is_empty());
        assert_eq!(plan.skipped_markdown, vec!["Scratch/only.md"]);
        assert_eq!(rels(&plan.images), vec!["Scratch/img/pic.png"]);
        assert_eq!(
            plan.images[0].destination,
            tmp.path().join("out/note_image").join("Scratch/img/pic.png")
        );
    }

    #[test]
    fn nested_clusters_count_descendants() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "notes/DB/intro.md");
        touch(tmp.path(), "notes/DB/mysql/index.md");
        let plan = plan_for(&tmp, 2);
        // DB holds two notes in its subtree, DB/mysql only one.
        assert_eq!(rels(&plan.markdown), vec!["DB/intro.md"]);
        assert_eq!(plan.skipped_markdown, vec!["DB/mysql/index.md"]);
    }

    #[test]
    fn lowering_threshold_never_shrinks_the_copy_set() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "notes/a/1.md");
        touch(tmp.path(), "notes/b/1.md");
        touch(tmp.path(), "notes/b/2.md");
        touch(tmp.path(), "notes/c/d/1.md");
        touch(tmp.path(), "notes/c/d/2.md");
        touch(tmp.path(), "notes/c/d/3.md");

        let mut previous: Vec<String> = Vec::new();
        for min_md in (1..=4).rev() {
            let plan = plan_for(&tmp, min_md);
            let current: Vec<String> = plan.markdown.iter().map(|c| c.relative.clone()).collect();
            for rel in &previous {
                assert!(current.contains(rel), "{rel} dropped when lowering to {min_md}");
            }
            previous = current;
        }
        assert_eq!(previous.len(), 6);
    }
}
