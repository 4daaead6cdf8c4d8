//! Shared CLI utilities.

use crate::config::{load_config, FileConfig};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub fn working_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to read the current directory")
}

/// Load the config file for a run rooted at `root` (explicit path wins).
pub fn load_file_config(root: &Path, explicit: Option<&Path>) -> Result<FileConfig> {
    let cfg = load_config(root, explicit)?;
    if let Some(source) = &cfg.source {
        tracing::info!("[config] using {}", source.display());
    }
    Ok(cfg)
}
