//! Covers command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::utils::working_dir;
use crate::cover::{run_rename, RenameOptions};
use crate::utils::resolve_under;

#[derive(Args)]
pub struct CoversArgs {
    /// Cover pool directory
    #[arg(long, value_name = "DIR", default_value = "source/images/cover")]
    pub dir: PathBuf,

    /// First number to assign
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub start: usize,

    /// Extension for the new names
    #[arg(long, value_name = "EXT", default_value = ".jpg")]
    pub ext: String,

    /// Print the rename plan without touching files
    #[arg(long)]
    pub dry_run: bool,

    /// Replace existing files that hold a target name
    #[arg(long)]
    pub overwrite: bool,
}

pub fn run(args: CoversArgs) -> Result<()> {
    let dir = resolve_under(&working_dir()?, &args.dir);
    let options = RenameOptions {
        dir,
        start: args.start,
        ext: args.ext,
        dry_run: args.dry_run,
        overwrite: args.overwrite,
    };
    run_rename(&options)?;
    Ok(())
}
