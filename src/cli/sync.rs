//! Sync command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::utils::{load_file_config, working_dir};
use crate::config::{
    process_after_sync, resolve_sync, sync_site_source, ProcessOverrides, SyncOverrides,
};
use crate::process::run_process;
use crate::sync::run_sync;
use crate::utils::resolve_under;

#[derive(Args)]
pub struct SyncArgs {
    /// Base directory for the relative defaults below
    #[arg(long, value_name = "DIR")]
    pub repo_root: Option<PathBuf>,

    /// Notes source tree [default: notes]
    #[arg(long, value_name = "DIR")]
    pub notes: Option<PathBuf>,

    /// Article output directory [default: source/_posts]
    #[arg(long, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Image output directory [default: source/note_image]
    #[arg(long, value_name = "DIR")]
    pub image_target: Option<PathBuf>,

    /// Gitignore-style rule file, relative to the repo root [default: .bgignore]
    #[arg(long, value_name = "FILE")]
    pub ignore: Option<PathBuf>,

    /// Minimum Markdown files in a directory subtree for its notes to be copied [default: 2]
    #[arg(long, value_name = "N")]
    pub min_md: Option<usize>,

    /// Path to config file (notes-pipeline.toml or .notes-pipeline.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the plan without touching the filesystem
    #[arg(long)]
    pub dry_run: bool,

    /// Remove previously synced Markdown and images before copying
    #[arg(long)]
    pub delete: bool,

    /// Skip the post-processing step after copying
    #[arg(long)]
    pub no_post_process: bool,
}

pub fn run(args: SyncArgs, verbose: bool) -> Result<()> {
    let cwd = working_dir()?;
    let discovery_root = args.repo_root.as_ref().map(|r| resolve_under(&cwd, r)).unwrap_or_else(|| cwd.clone());
    let file = load_file_config(&discovery_root, args.config.as_deref())?;

    let overrides = SyncOverrides {
        repo_root: args.repo_root,
        notes: args.notes,
        target: args.target,
        image_target: args.image_target,
        ignore: args.ignore,
        min_md: args.min_md,
        dry_run: args.dry_run,
        delete: args.delete,
        no_post_process: args.no_post_process,
    };
    let options = resolve_sync(&overrides, &file.sync, &cwd);
    tracing::debug!(
        "[sync] notes={} target={} images={} min_md={}",
        options.notes_dir.display(),
        options.target_dir.display(),
        options.image_target_dir.display(),
        options.min_md
    );

    // Process settings are validated before anything is copied.
    let process_options = if options.post_process && !options.dry_run {
        let process_cli = ProcessOverrides { show_progress: !verbose, ..ProcessOverrides::default() };
        Some(process_after_sync(&options, &process_cli, &file.process)?)
    } else {
        None
    };

    run_sync(&options)?;

    if let Some(mut process_options) = process_options {
        if process_options.site_source.is_none() {
            process_options.site_source = sync_site_source(&options);
        }
        run_process(&process_options)?;
    }
    Ok(())
}
