//! Core types shared by the sync and process stages.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

pub const IMAGE_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp", "tiff", "tif", "ico", "avif"];

pub const DEFAULT_IMAGE_ROOT: &str = "/note_image";
pub const DEFAULT_COVER_DIR: &str = "/images/cover";
pub const DEFAULT_COVER_POOL: usize = 100;

fn lowercase_extension(path: &Path) -> String {
    path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase()
}

pub fn is_markdown(path: &Path) -> bool {
    MARKDOWN_EXTENSIONS.contains(&lowercase_extension(path).as_str())
}

pub fn is_image(path: &Path) -> bool {
    IMAGE_EXTENSIONS.contains(&lowercase_extension(path).as_str())
}

/// Template neutralization mode for `{% raw %}` wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawWrapMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl RawWrapMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RawWrapMode::Auto => "auto",
            RawWrapMode::Always => "always",
            RawWrapMode::Never => "never",
        }
    }
}

impl FromStr for RawWrapMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(RawWrapMode::Auto),
            "always" => Ok(RawWrapMode::Always),
            "never" => Ok(RawWrapMode::Never),
            _ => Err(PipelineError::InvalidValue {
                flag: "--raw-wrap",
                value: s.to_string(),
                expected: "auto, always, never",
            }),
        }
    }
}

/// Which git date a commit contributes to article timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateKind {
    #[default]
    Author,
    Committer,
}

impl DateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateKind::Author => "author",
            DateKind::Committer => "committer",
        }
    }
}

impl FromStr for DateKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "author" => Ok(DateKind::Author),
            "committer" => Ok(DateKind::Committer),
            _ => Err(PipelineError::InvalidValue {
                flag: "--git-date",
                value: s.to_string(),
                expected: "author, committer",
            }),
        }
    }
}

/// Keyword extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMethod {
    #[default]
    Tfidf,
    Textrank,
    None,
}

impl TagMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagMethod::Tfidf => "tfidf",
            TagMethod::Textrank => "textrank",
            TagMethod::None => "none",
        }
    }
}

impl FromStr for TagMethod {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tfidf" | "tf-idf" => Ok(TagMethod::Tfidf),
            "textrank" => Ok(TagMethod::Textrank),
            "none" | "off" | "false" | "0" => Ok(TagMethod::None),
            _ => Err(PipelineError::InvalidValue {
                flag: "--tag-method",
                value: s.to_string(),
                expected: "tfidf, textrank, none",
            }),
        }
    }
}

/// Resolved options for one `sync` run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub repo_root: PathBuf,
    pub notes_dir: PathBuf,
    pub target_dir: PathBuf,
    pub image_target_dir: PathBuf,
    pub ignore_file: PathBuf,
    pub min_md: usize,
    pub dry_run: bool,
    pub delete_before_sync: bool,
    pub post_process: bool,
}

/// Resolved options for one `process` run.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub target_dir: PathBuf,
    pub notes_dir: Option<PathBuf>,
    /// Hexo `source/` directory, used to check that site-absolute images exist.
    pub site_source: Option<PathBuf>,
    pub image_root: String,
    pub tag_count: usize,
    pub tag_budget: usize,
    pub tag_method: TagMethod,
    pub cover_dir: String,
    pub cover_pool: usize,
    pub cover_count: usize,
    pub raw_wrap: RawWrapMode,
    pub escape_curly: bool,
    pub date_kind: DateKind,
    pub git_batch: bool,
    pub require_history: bool,
    /// Epoch seconds used when no history is available.
    pub timestamp: Option<i64>,
    pub force_regen: bool,
    pub show_progress: bool,
}

impl ProcessOptions {
    pub fn new(target_dir: PathBuf) -> Self {
        Self {
            target_dir,
            notes_dir: None,
            site_source: None,
            image_root: DEFAULT_IMAGE_ROOT.to_string(),
            tag_count: 3,
            tag_budget: 100,
            tag_method: TagMethod::Tfidf,
            cover_dir: DEFAULT_COVER_DIR.to_string(),
            cover_pool: DEFAULT_COVER_POOL,
            cover_count: 1,
            raw_wrap: RawWrapMode::Auto,
            escape_curly: true,
            date_kind: DateKind::Author,
            git_batch: true,
            require_history: true,
            timestamp: None,
            force_regen: false,
            show_progress: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_extensions_case_insensitively() {
        assert!(is_markdown(Path::new("a/b/Note.MD")));
        assert!(is_markdown(Path::new("x.markdown")));
        assert!(!is_markdown(Path::new("x.txt")));
        assert!(is_image(Path::new("img/Photo.JPG")));
        assert!(is_image(Path::new("diagram.svg")));
        assert!(!is_image(Path::new("notes.md")));
        assert!(!is_image(Path::new("Makefile")));
    }

    #[test]
    fn parses_modes() {
        assert_eq!("ALWAYS".parse::<RawWrapMode>().unwrap(), RawWrapMode::Always);
        assert_eq!("committer".parse::<DateKind>().unwrap(), DateKind::Committer);
        assert_eq!("off".parse::<TagMethod>().unwrap(), TagMethod::None);
        let err = "sometimes".parse::<RawWrapMode>().unwrap_err();
        assert!(err.to_string().contains("Invalid --raw-wrap value"));
    }
}
