//! Sync stage: copy admitted notes and all images into the site.

use crate::domain::{is_image, is_markdown, SyncOptions};
use crate::error::PipelineError;
use crate::scan::scan_notes;
use crate::utils::read_text_best_effort;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

pub mod plan;

pub use plan::{PlannedCopy, SyncPlan};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub copied_markdown: usize,
    pub skipped_markdown: usize,
    pub copied_images: usize,
    pub deleted_markdown: usize,
    pub deleted_images: usize,
}

/// Scan, plan and (unless dry-run) apply one sync.
///
/// Copy failures abort the run: a half-synced site is worse than none.
pub fn run_sync(options: &SyncOptions) -> Result<SyncSummary> {
    if !options.notes_dir.is_dir() {
        return Err(PipelineError::MissingSource(options.notes_dir.clone()).into());
    }

    let scan = scan_notes(&options.notes_dir, &options.ignore_file)?;
    tracing::info!(
        "[scan] markdown={}, images={} (after ignore)",
        scan.markdown.len(),
        scan.images.len()
    );
    tracing::info!(
        "[scan] files_seen={}, ignored={}, pruned_dirs={}, other={}",
        scan.stats.files_seen,
        scan.stats.files_ignored,
        scan.stats.dirs_pruned,
        scan.stats.other_files
    );
    let plan = SyncPlan::build(&scan, options);

    let mut summary = SyncSummary {
        skipped_markdown: plan.skipped_markdown.len(),
        ..SyncSummary::default()
    };

    if options.delete_before_sync {
        if options.dry_run {
            println!("[dry-run] delete markdown under {}", options.target_dir.display());
            println!("[dry-run] delete images under {}", options.image_target_dir.display());
        } else {
            summary.deleted_markdown = clear_matching(&options.target_dir, is_markdown)?;
            summary.deleted_images = clear_matching(&options.image_target_dir, is_image)?;
            tracing::info!(
                "[delete] removed markdown files: {}, image files: {}",
                summary.deleted_markdown,
                summary.deleted_images
            );
        }
    }

    for copy in &plan.markdown {
        if options.dry_run {
            println!("[dry-run] copy {} -> {}", copy.source.display(), copy.destination.display());
        } else {
            copy_markdown(copy)?;
        }
        summary.copied_markdown += 1;
    }

    for copy in &plan.images {
        if options.dry_run {
            println!("[dry-run] copy {} -> {}", copy.source.display(), copy.destination.display());
        } else {
            copy_binary(copy)?;
        }
        summary.copied_images += 1;
    }

    println!(
        "done: copied_md={}, skipped_md={}, copied_img={}, target={}",
        summary.copied_markdown,
        summary.skipped_markdown,
        summary.copied_images,
        options.target_dir.display()
    );
    Ok(summary)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed creating directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Markdown is re-encoded as UTF-8 on the way in.
fn copy_markdown(copy: &PlannedCopy) -> Result<()> {
    let decoded = read_text_best_effort(&copy.source)?;
    if decoded.encoding != "UTF-8" {
        tracing::debug!("[encoding] {} read as {}", copy.relative, decoded.encoding);
    }
    ensure_parent(&copy.destination)?;
    fs::write(&copy.destination, decoded.content)
        .with_context(|| format!("Failed writing {}", copy.destination.display()))?;
    tracing::debug!("[copy] {}", copy.relative);
    Ok(())
}

fn copy_binary(copy: &PlannedCopy) -> Result<()> {
    ensure_parent(&copy.destination)?;
    fs::copy(&copy.source, &copy.destination).with_context(|| {
        format!("Failed copying {} -> {}", copy.source.display(), copy.destination.display())
    })?;
    Ok(())
}

/// Delete files under `dir` accepted by `matches`, then prune empty
/// directories bottom-up. `dir` itself is kept (and created if missing).
fn clear_matching(dir: &Path, matches: fn(&Path) -> bool) -> Result<usize> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed creating directory: {}", dir.display()))?;
        return Ok(0);
    }

    let mut deleted = 0usize;
    let mut dirs = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry.with_context(|| format!("Failed walking {}", dir.display()))?;
        let path = entry.path();
        if entry.file_type().is_dir() {
            dirs.push(path.to_path_buf());
        } else if matches(path) {
            fs::remove_file(path)
                .with_context(|| format!("Failed removing {}", path.display()))?;
            deleted += 1;
        }
    }

    // Deepest first; non-empty directories simply stay.
    dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));
    for d in dirs {
        let _ = fs::remove_dir(&d);
    }
    Ok(deleted)
}
