//! Config file loading

use crate::domain::{DateKind, RawWrapMode, TagMethod};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const SECTION: &str = "notes-pipeline";

/// `[sync]` table. Every key is optional; unset keys fall through to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncFileConfig {
    pub repo_root: Option<PathBuf>,
    pub notes: Option<PathBuf>,
    pub target: Option<PathBuf>,
    pub image_target: Option<PathBuf>,
    pub ignore: Option<PathBuf>,
    pub min_md: Option<usize>,
    pub delete: Option<bool>,
    pub post_process: Option<bool>,
}

/// `[process]` table, also applied to the post-processing step of `sync`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProcessFileConfig {
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
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub sync: SyncFileConfig,
    pub process: ProcessFileConfig,
    /// Where the config came from, if anywhere.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Load the config file, explicit or discovered in `repo_root`.
///
/// An explicit file that fails to load is an error. A discovered one only
/// warns and yields the defaults.
pub fn load_config(repo_root: &Path, config_path: Option<&Path>) -> Result<FileConfig> {
    let explicit = config_path.is_some();

    let discovered = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(repo_root),
    };
    let Some(config_file) = discovered else {
        return Ok(FileConfig::default());
    };

    match read_config(&config_file) {
        Ok(mut cfg) => {
            tracing::debug!("[config] loaded {}", config_file.display());
            cfg.source = Some(config_file);
            Ok(cfg)
        }
        Err(e) if explicit => Err(e),
        Err(e) => {
            tracing::warn!(
                "Failed to load auto-discovered config {}: {:#}",
                config_file.display(),
                e
            );
            Ok(FileConfig::default())
        }
    }
}

fn read_config(config_file: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(config_file)
        .with_context(|| format!("Failed reading config file: {}", config_file.display()))?;
    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "toml" => parse_toml_config(&content, config_file),
        "yaml" | "yml" => parse_yaml_config(&content, config_file),
        other => anyhow::bail!(
            "Unsupported config extension '.{}' for file {}",
            other,
            config_file.display()
        ),
    }
}

/// Parse TOML, accepting the tables at top level or under `[notes-pipeline]`.
fn parse_toml_config(content: &str, config_file: &Path) -> Result<FileConfig> {
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", config_file.display()))?;
    let config_val = match raw.get(SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };
    config_val.try_into().with_context(|| format!("Invalid TOML config: {}", config_file.display()))
}

fn parse_yaml_config(content: &str, config_file: &Path) -> Result<FileConfig> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", config_file.display()))?;
    let config_val = match raw.get(SECTION) {
        Some(nested) => nested.clone(),
        None if raw.is_null() => return Ok(FileConfig::default()),
        None => raw,
    };
    serde_yaml::from_value(config_val)
        .with_context(|| format!("Invalid YAML config: {}", config_file.display()))
}

fn discover_config(repo_root: &Path) -> Option<PathBuf> {
    let candidates = [
        "notes-pipeline.toml",
        ".notes-pipeline.toml",
        "notes-pipeline.yml",
        ".notes-pipeline.yml",
        "notes-pipeline.yaml",
        ".notes-pipeline.yaml",
    ];
    candidates.iter().map(|c| repo_root.join(c)).find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_missing() {
        let tmp = TempDir::new().expect("tmp");
        let cfg = load_config(tmp.path(), None).expect("config");
        assert_eq!(cfg, FileConfig::default());
    }

    #[test]
    fn loads_discovered_toml() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(
            tmp.path().join("notes-pipeline.toml"),
            "[sync]\nmin_md = 3\nnotes = 'vault'\n\n[process]\ntag_method = 'textrank'\nraw_wrap = 'always'\n",
        )
        .expect("write");

        let cfg = load_config(tmp.path(), None).expect("config");
        assert_eq!(cfg.sync.min_md, Some(3));
        assert_eq!(cfg.sync.notes, Some(PathBuf::from("vault")));
        assert_eq!(cfg.process.tag_method, Some(TagMethod::Textrank));
        assert_eq!(cfg.process.raw_wrap, Some(RawWrapMode::Always));
        assert!(cfg.source.is_some());
    }

    #[test]
    fn accepts_nested_section_in_yaml() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join(".notes-pipeline.yml");
        fs::write(&path, "notes-pipeline:\n  process:\n    git_date: committer\n    tag_count: 5\n")
            .expect("write");

        let cfg = load_config(tmp.path(), None).expect("config");
        assert_eq!(cfg.process.git_date, Some(DateKind::Committer));
        assert_eq!(cfg.process.tag_count, Some(5));
    }

    #[test]
    fn explicit_invalid_config_is_an_error() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "[sync]\nmin_md = 'lots'\n").expect("write");
        assert!(load_config(tmp.path(), Some(&path)).is_err());

        let path = tmp.path().join("conf.ini");
        fs::write(&path, "x=1").expect("write");
        assert!(load_config(tmp.path(), Some(&path)).is_err());
    }

    #[test]
    fn discovered_invalid_config_falls_back_to_defaults() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("notes-pipeline.toml"), "[process]\nraw_wrap = 'sometimes'\n")
            .expect("write");
        let cfg = load_config(tmp.path(), None).expect("should not error on auto-discovery");
        assert_eq!(cfg, FileConfig::default());
    }
}
