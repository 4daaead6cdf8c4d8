//! CLI > config file > defaults.

use super::loader::{ProcessFileConfig, SyncFileConfig};
use crate::domain::{DateKind, ProcessOptions, RawWrapMode, SyncOptions, TagMethod};
use crate::error::PipelineError;
use crate::site::site_source_for;
use crate::utils::resolve_under;
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_NOTES: &str = "notes";
pub const DEFAULT_TARGET: &str = "source/_posts";
pub const DEFAULT_IMAGE_TARGET: &str = "source/note_image";
pub const DEFAULT_IGNORE: &str = ".bgignore";
pub const DEFAULT_MIN_MD: usize = 2;

/// Sync flags as given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct SyncOverrides {
    pub repo_root: Option<PathBuf>,
    pub notes: Option<PathBuf>,
    pub target: Option<PathBuf>,
    pub image_target: Option<PathBuf>,
    pub ignore: Option<PathBuf>,
    pub min_md: Option<usize>,
    pub dry_run: bool,
    pub delete: bool,
    pub no_post_process: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProcessOverrides {
    pub repo_root: Option<PathBuf>,
    pub target: Option<PathBuf>,
    pub notes: Option<PathBuf>,
    pub tag_count: Option<usize>,
    pub tag_budget: Option<usize>,
    pub tag_method: Option<TagMethod>,
    pub image_root: Option<String>,
    pub cover_dir: Option<String>,
    pub cover_pool: Option<usize>,
    pub cover_count: Option<usize>,
    pub raw_wrap: Option<RawWrapMode>,
    pub escape_curly: Option<bool>,
    pub git_date: Option<DateKind>,
    pub git_batch: Option<bool>,
    pub require_history: Option<bool>,
    pub timestamp: Option<i64>,
    pub force_regen: bool,
    pub show_progress: bool,
}

/// Resolve sync options. Relative paths are anchored at the repo root.
pub fn resolve_sync(cli: &SyncOverrides, file: &SyncFileConfig, cwd: &Path) -> SyncOptions {
    let repo_root = match cli.repo_root.as_ref().or(file.repo_root.as_ref()) {
        Some(root) => resolve_under(cwd, root),
        None => cwd.to_path_buf(),
    };
    let pick = |flag: &Option<PathBuf>, cfg: &Option<PathBuf>, default: &str| {
        resolve_under(&repo_root, &flag.clone().or_else(|| cfg.clone()).unwrap_or_else(|| default.into()))
    };

    SyncOptions {
        notes_dir: pick(&cli.notes, &file.notes, DEFAULT_NOTES),
        target_dir: pick(&cli.target, &file.target, DEFAULT_TARGET),
        image_target_dir: pick(&cli.image_target, &file.image_target, DEFAULT_IMAGE_TARGET),
        ignore_file: pick(&cli.ignore, &file.ignore, DEFAULT_IGNORE),
        min_md: cli.min_md.or(file.min_md).unwrap_or(DEFAULT_MIN_MD).max(1),
        dry_run: cli.dry_run,
        delete_before_sync: cli.delete || file.delete.unwrap_or(false),
        post_process: !cli.no_post_process && file.post_process.unwrap_or(true),
        repo_root,
    }
}

/// Apply process settings on top of `base`.
///
/// `base` carries the target and notes already decided by the caller; only
/// the tuning knobs come from flags and the config file here.
pub fn apply_process_settings(
    mut base: ProcessOptions,
    cli: &ProcessOverrides,
    file: &ProcessFileConfig,
) -> Result<ProcessOptions> {
    if let Some(v) = cli.tag_count.or(file.tag_count) {
        base.tag_count = v;
    }
    if let Some(v) = cli.tag_budget.or(file.tag_budget) {
        base.tag_budget = v;
    }
    if let Some(v) = cli.tag_method.or(file.tag_method) {
        base.tag_method = v;
    }
    if let Some(v) = cli.image_root.clone().or_else(|| file.image_root.clone()) {
        base.image_root = v;
    }
    if let Some(v) = cli.cover_dir.clone().or_else(|| file.cover_dir.clone()) {
        base.cover_dir = v;
    }
    if let Some(v) = cli.cover_pool.or(file.cover_pool) {
        base.cover_pool = v;
    }
    if let Some(v) = cli.cover_count.or(file.cover_count) {
        base.cover_count = v;
    }
    if let Some(v) = cli.raw_wrap.or(file.raw_wrap) {
        base.raw_wrap = v;
    }
    if let Some(v) = cli.escape_curly.or(file.escape_curly) {
        base.escape_curly = v;
    }
    if let Some(v) = cli.git_date.or(file.git_date) {
        base.date_kind = v;
    }
    if let Some(v) = cli.git_batch.or(file.git_batch) {
        base.git_batch = v;
    }
    if let Some(v) = cli.require_history.or(file.require_history) {
        base.require_history = v;
    }
    base.timestamp = cli.timestamp.or(base.timestamp);
    base.force_regen |= cli.force_regen;
    base.show_progress |= cli.show_progress;

    validate_process(&base)?;
    Ok(base)
}

fn validate_process(options: &ProcessOptions) -> Result<()> {
    if options.cover_pool == 0 {
        return Err(invalid("--cover-pool", "0", "an integer >= 1"));
    }
    if options.cover_count == 0 {
        return Err(invalid("--cover-count", "0", "an integer >= 1"));
    }
    if options.cover_count > options.cover_pool {
        return Err(PipelineError::Incompatible(format!(
            "--cover-count {} exceeds --cover-pool {}",
            options.cover_count, options.cover_pool
        ))
        .into());
    }
    if !options.image_root.starts_with('/') {
        return Err(invalid("--image-root", &options.image_root, "a site path starting with '/'"));
    }
    if !options.cover_dir.starts_with('/') {
        return Err(invalid("--cover-dir", &options.cover_dir, "a site path starting with '/'"));
    }
    Ok(())
}

fn invalid(flag: &'static str, value: &str, expected: &'static str) -> anyhow::Error {
    PipelineError::InvalidValue { flag, value: value.to_string(), expected }.into()
}

/// Resolve options for a standalone `process` run.
pub fn resolve_process(
    cli: &ProcessOverrides,
    file: &ProcessFileConfig,
    cwd: &Path,
) -> Result<ProcessOptions> {
    let base_dir = match &cli.repo_root {
        Some(root) => resolve_under(cwd, root),
        None => cwd.to_path_buf(),
    };
    let Some(target) = cli.target.clone().or_else(|| file.target.clone()) else {
        bail!("process needs a target directory: pass --target or set [process] target");
    };
    let target = resolve_under(&base_dir, &target);

    let mut base = ProcessOptions::new(target.clone());
    base.notes_dir = cli.notes.clone().or_else(|| file.notes.clone()).map(|n| resolve_under(&base_dir, &n));
    base.site_source = site_source_for(&target);
    apply_process_settings(base, cli, file)
}

/// Options for the post-processing step that follows a real sync.
pub fn process_after_sync(
    sync: &SyncOptions,
    cli: &ProcessOverrides,
    file: &ProcessFileConfig,
) -> Result<ProcessOptions> {
    let mut base = ProcessOptions::new(sync.target_dir.clone());
    base.notes_dir = Some(sync.notes_dir.clone());
    base.site_source = sync_site_source(sync);
    apply_process_settings(base, cli, file)
}

/// Site `source/` for a sync: the Hexo root's, else the image target's parent.
///
/// The parent may only exist once the sync has copied something into it.
pub fn sync_site_source(sync: &SyncOptions) -> Option<PathBuf> {
    site_source_for(&sync.target_dir)
        .or_else(|| sync.image_target_dir.parent().map(Path::to_path_buf).filter(|p| p.is_dir()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_defaults_anchor_at_repo_root() {
        let cwd = Path::new("/work");
        let opts = resolve_sync(&SyncOverrides::default(), &SyncFileConfig::default(), cwd);
        assert_eq!(opts.repo_root, PathBuf::from("/work"));
        assert_eq!(opts.notes_dir, PathBuf::from("/work/notes"));
        assert_eq!(opts.target_dir, PathBuf::from("/work/source/_posts"));
        assert_eq!(opts.min_md, 2);
        assert!(opts.post_process);
        assert!(!opts.delete_before_sync);
    }

    #[test]
    fn cli_beats_file_beats_default() {
        let file = SyncFileConfig {
            notes: Some("vault".into()),
            min_md: Some(4),
            post_process: Some(false),
            ..SyncFileConfig::default()
        };
        let cli = SyncOverrides {
            repo_root: Some("/blog".into()),
            min_md: Some(0),
            ..SyncOverrides::default()
        };
        let opts = resolve_sync(&cli, &file, Path::new("/ignored"));
        assert_eq!(opts.notes_dir, PathBuf::from("/blog/vault"));
        // clamped to at least one
        assert_eq!(opts.min_md, 1);
        assert!(!opts.post_process);
    }

    #[test]
    fn process_settings_merge_in_order() {
        let file = ProcessFileConfig {
            tag_count: Some(5),
            tag_method: Some(TagMethod::Textrank),
            git_batch: Some(false),
            ..ProcessFileConfig::default()
        };
        let cli = ProcessOverrides {
            target: Some("posts".into()),
            tag_count: Some(2),
            timestamp: Some(42),
            ..ProcessOverrides::default()
        };
        let opts = resolve_process(&cli, &file, Path::new("/site")).unwrap();
        assert_eq!(opts.target_dir, PathBuf::from("/site/posts"));
        assert_eq!(opts.tag_count, 2);
        assert_eq!(opts.tag_method, TagMethod::Textrank);
        assert!(!opts.git_batch);
        assert_eq!(opts.timestamp, Some(42));
        assert!(opts.notes_dir.is_none());
    }

    #[test]
    fn process_requires_a_target() {
        let err = resolve_process(&ProcessOverrides::default(), &ProcessFileConfig::default(), Path::new("/"))
            .unwrap_err();
        assert!(err.to_string().contains("--target"));
    }

    #[test]
    fn rejects_inconsistent_cover_settings() {
        let cli = ProcessOverrides {
            target: Some("/posts".into()),
            cover_pool: Some(2),
            cover_count: Some(3),
            ..ProcessOverrides::default()
        };
        let err = resolve_process(&cli, &ProcessFileConfig::default(), Path::new("/")).unwrap_err();
        assert!(matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::Incompatible(_))));

        let cli = ProcessOverrides {
            target: Some("/posts".into()),
            image_root: Some("note_image".into()),
            ..ProcessOverrides::default()
        };
        assert!(resolve_process(&cli, &ProcessFileConfig::default(), Path::new("/")).is_err());
    }
}
