//! Process command implementation

use anyhow::Result;
use clap::builder::BoolishValueParser;
use clap::Args;
use std::path::PathBuf;

use super::utils::{load_file_config, working_dir};
use crate::config::{resolve_process, ProcessOverrides};
use crate::domain::{DateKind, RawWrapMode, TagMethod};
use crate::process::run_process;
use crate::utils::resolve_under;

#[derive(Args)]
pub struct ProcessArgs {
    /// Article directory to rewrite in place
    #[arg(long, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Notes tree whose git history supplies dates
    #[arg(long, value_name = "DIR")]
    pub notes: Option<PathBuf>,

    /// Base directory for relative paths and config discovery
    #[arg(long, value_name = "DIR")]
    pub repo_root: Option<PathBuf>,

    /// Path to config file (notes-pipeline.toml or .notes-pipeline.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Tags per article [default: 3]
    #[arg(long, value_name = "N")]
    pub tag_count: Option<usize>,

    /// Distinct tags allowed across the whole run [default: 100]
    #[arg(long, value_name = "N")]
    pub tag_budget: Option<usize>,

    /// Keyword ranking: tfidf, textrank or none [default: tfidf]
    #[arg(long, value_name = "METHOD")]
    pub tag_method: Option<TagMethod>,

    /// Site path prefix for rewritten image links [default: /note_image]
    #[arg(long, value_name = "URL")]
    pub image_root: Option<String>,

    /// Site path of the fallback cover pool [default: /images/cover]
    #[arg(long, value_name = "URL")]
    pub cover_dir: Option<String>,

    /// Number of images in the cover pool [default: 100]
    #[arg(long, value_name = "N")]
    pub cover_pool: Option<usize>,

    /// Covers per article [default: 1]
    #[arg(long, value_name = "N")]
    pub cover_count: Option<usize>,

    /// Wrap bodies in {% raw %}: auto, always or never [default: auto]
    #[arg(long, value_name = "MODE")]
    pub raw_wrap: Option<RawWrapMode>,

    /// Replace {{ and }} in bodies with HTML entities [default: true]
    #[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub escape_curly: Option<bool>,

    /// Commit date used for timestamps: author or committer [default: author]
    #[arg(long, value_name = "KIND")]
    pub git_date: Option<DateKind>,

    /// Walk history once for all files instead of once per file [default: true]
    #[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub git_batch: Option<bool>,

    /// Fail a file that has no git history instead of using the fallback time [default: true]
    #[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub require_history: Option<bool>,

    /// Fallback timestamp in epoch seconds [default: now]
    #[arg(long, value_name = "SECS")]
    pub timestamp: Option<i64>,

    /// Regenerate headers that are already complete
    #[arg(long)]
    pub force_regen: bool,
}

pub fn run(args: ProcessArgs, verbose: bool) -> Result<()> {
    let cwd = working_dir()?;
    let root = args.repo_root.as_ref().map(|r| resolve_under(&cwd, r)).unwrap_or_else(|| cwd.clone());
    let file = load_file_config(&root, args.config.as_deref())?;

    let overrides = ProcessOverrides {
        repo_root: args.repo_root,
        target: args.target,
        notes: args.notes,
        tag_count: args.tag_count,
        tag_budget: args.tag_budget,
        tag_method: args.tag_method,
        image_root: args.image_root,
        cover_dir: args.cover_dir,
        cover_pool: args.cover_pool,
        cover_count: args.cover_count,
        raw_wrap: args.raw_wrap,
        escape_curly: args.escape_curly,
        git_date: args.git_date,
        git_batch: args.git_batch,
        require_history: args.require_history,
        timestamp: args.timestamp,
        force_regen: args.force_regen,
        show_progress: !verbose,
    };
    let options = resolve_process(&overrides, &file.process, &cwd)?;
    tracing::debug!(
        "[process] target={} notes={:?} site_source={:?}",
        options.target_dir.display(),
        options.notes_dir,
        options.site_source
    );

    run_process(&options)?;
    Ok(())
}
