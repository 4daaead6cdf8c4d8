//! Published articles: loading, header derivation inputs and rendering.

use crate::utils::read_text_best_effort;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub mod front_matter;
pub mod images;
pub mod template;

pub use front_matter::{merge, split_front_matter, DerivedFields, FrontMatter};
pub use images::{extract_images, rewrite_image_urls};
pub use template::protect_body;

/// One Markdown file under the posts directory.
#[derive(Debug, Clone)]
pub struct Article {
    /// POSIX path relative to the posts directory.
    pub relative: String,
    pub path: PathBuf,
    /// Full decoded content as read from disk, BOM removed.
    pub original: String,
    pub header: Option<FrontMatter>,
    pub body: String,
}

impl Article {
    /// Read and split an article. A malformed header is an error.
    pub fn load(path: &Path, relative: &str) -> Result<Self> {
        let decoded = read_text_best_effort(path)?;
        let original = decoded.content;
        let split = split_front_matter(&original);
        let header = match &split.header {
            Some(raw) => Some(FrontMatter::parse(raw)?),
            None => None,
        };
        let body = split.body.to_string();
        Ok(Self { relative: relative.to_string(), path: path.to_path_buf(), original, header, body })
    }

    /// File stem used as the default title.
    pub fn title(&self) -> String {
        Path::new(&self.relative)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Top-level directory of the relative path, if any.
    pub fn categories(&self) -> Vec<String> {
        match self.relative.split_once('/') {
            Some((top, _)) if !top.is_empty() => vec![top.to_string()],
            _ => Vec::new(),
        }
    }

    /// Directory of the article relative to the posts root (`.` at the top).
    pub fn directory(&self) -> &str {
        crate::utils::posix_parent(&self.relative)
    }

    pub fn is_complete(&self) -> bool {
        self.header.as_ref().map(FrontMatter::is_complete).unwrap_or(false)
    }
}

/// Join a rendered header and a body into a full document.
///
/// A body that did not follow a header before gets a blank separator line.
pub fn assemble(header: &str, body: &str, had_header: bool) -> String {
    if had_header || body.starts_with('\n') || body.starts_with("\r\n") {
        format!("{header}{body}")
    } else {
        format!("{header}\n{body}")
    }
}
