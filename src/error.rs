//! Error types for the pipeline.
//!
//! Configuration problems that must stop a run are modelled here. Everything
//! else travels as `anyhow::Error` with context attached at the I/O site.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("notes directory does not exist or is not a directory: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("notes directory is not inside a git working copy: {} ({reason})", .path.display())]
    NotAGitRepository { path: PathBuf, reason: String },

    #[error("target directory does not exist: {}", .0.display())]
    MissingTarget(PathBuf),

    #[error("Invalid {flag} value '{value}' (expected one of: {expected})")]
    InvalidValue { flag: &'static str, value: String, expected: &'static str },

    #[error("{0}")]
    Incompatible(String),
}

/// A file that could not be processed; the run continues without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: String,
    pub reason: String,
}

impl FileFailure {
    pub fn new(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self { path: path.into(), reason: reason.to_string() }
    }
}
