//! Renumber a cover pool directory into `cover-<n><ext>`.

use crate::domain::is_image;
use crate::error::PipelineError;
use anyhow::{bail, Context, Result};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RenameOptions {
    pub dir: PathBuf,
    pub start: usize,
    pub ext: String,
    pub dry_run: bool,
    pub overwrite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub dir: PathBuf,
    pub sources: Vec<String>,
    pub targets: Vec<String>,
}

impl RenamePlan {
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sources.iter().map(String::as_str).zip(self.targets.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum NamePart {
    // Leading zeros stripped; compared by length first.
    Number(usize, String),
    Text(String),
}

/// Sort key comparing digit runs numerically: `img2` < `img10`.
fn natural_key(name: &str) -> Vec<NamePart> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_digits = false;

    let flush = |buf: &mut String, digits: bool, parts: &mut Vec<NamePart>| {
        if buf.is_empty() {
            return;
        }
        if digits {
            let trimmed = buf.trim_start_matches('0');
            let trimmed = if trimmed.is_empty() { "0" } else { trimmed };
            parts.push(NamePart::Number(trimmed.len(), trimmed.to_string()));
        } else {
            parts.push(NamePart::Text(buf.to_lowercase()));
        }
        buf.clear();
    };

    for c in name.chars() {
        let is_digit = c.is_ascii_digit();
        if is_digit != in_digits {
            flush(&mut current, in_digits, &mut parts);
            in_digits = is_digit;
        }
        current.push(c);
    }
    flush(&mut current, in_digits, &mut parts);
    parts
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a).cmp(&natural_key(b)).then_with(|| a.cmp(b))
}

fn normalize_ext(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

fn list_images(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() && is_image(&path) {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort_by(|a, b| natural_cmp(a, b));
    Ok(names)
}

/// Build and validate the rename plan without touching anything.
pub fn plan_renames(options: &RenameOptions) -> Result<RenamePlan> {
    if !options.dir.is_dir() {
        return Err(PipelineError::MissingSource(options.dir.clone()).into());
    }
    if options.start == 0 {
        return Err(PipelineError::InvalidValue {
            flag: "--start",
            value: "0".to_string(),
            expected: "an integer >= 1",
        }
        .into());
    }

    let ext = normalize_ext(&options.ext);
    let sources = list_images(&options.dir)?;
    let targets: Vec<String> =
        (0..sources.len()).map(|i| format!("cover-{}{}", options.start + i, ext)).collect();

    if !options.overwrite {
        let involved: HashSet<&str> = sources.iter().map(String::as_str).collect();
        for target in &targets {
            if !involved.contains(target.as_str()) && options.dir.join(target).exists() {
                bail!(
                    "Target already exists and is not part of the rename: {} (use --overwrite)",
                    options.dir.join(target).display()
                );
            }
        }
    }

    let non_jpeg: Vec<&String> = sources
        .iter()
        .filter(|name| {
            let lower = name.to_lowercase();
            !lower.ends_with(".jpg") && !lower.ends_with(".jpeg")
        })
        .collect();
    if ext == ".jpg" && !non_jpeg.is_empty() {
        tracing::warn!(
            "{} non-JPEG images will be renamed to .jpg without conversion",
            non_jpeg.len()
        );
    }

    Ok(RenamePlan { dir: options.dir.clone(), sources, targets })
}

/// Two-phase rename: every source moves to a temporary name first, so a
/// target that is also a source never gets clobbered.
fn apply(plan: &RenamePlan, overwrite: bool) -> Result<()> {
    let token = format!("{}_{}", std::process::id(), chrono::Utc::now().timestamp_millis());
    let temps: Vec<PathBuf> = (0..plan.len())
        .map(|i| plan.dir.join(format!(".__tmp_cover_{token}_{i}")))
        .collect();

    for (source, temp) in plan.sources.iter().zip(&temps) {
        let from = plan.dir.join(source);
        fs::rename(&from, temp)
            .with_context(|| format!("Failed to move {} aside", from.display()))?;
        tracing::debug!("[tmp] {} -> {}", source, temp.display());
    }

    for (temp, target) in temps.iter().zip(&plan.targets) {
        let to = plan.dir.join(target);
        if to.exists() {
            if !overwrite {
                bail!("Target already exists: {}", to.display());
            }
            fs::remove_file(&to).with_context(|| format!("Failed to remove {}", to.display()))?;
        }
        fs::rename(temp, &to).with_context(|| format!("Failed to rename to {}", to.display()))?;
        tracing::debug!("[ok] {}", target);
    }
    Ok(())
}

pub fn run_rename(options: &RenameOptions) -> Result<RenamePlan> {
    let plan = plan_renames(options)?;
    if plan.is_empty() {
        println!("no images found in {}", plan.dir.display());
        return Ok(plan);
    }

    if options.dry_run {
        println!("dir: {}", plan.dir.display());
        println!("count: {}", plan.len());
        for (from, to) in plan.pairs() {
            println!("[dry-run] mv {from} -> {to}");
        }
        return Ok(plan);
    }

    apply(&plan, options.overwrite)?;
    println!("done: renamed {} files in {}", plan.len(), plan.dir.display());
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options(dir: &Path) -> RenameOptions {
        RenameOptions {
            dir: dir.to_path_buf(),
            start: 1,
            ext: ".jpg".to_string(),
            dry_run: false,
            overwrite: false,
        }
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut out: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        out.sort();
        out
    }

    #[test]
    fn natural_order_compares_numbers() {
        let mut items = vec!["img10.jpg", "img2.jpg", "IMG1.jpg", "img02b.jpg", "alpha.png"];
        items.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(items, vec!["alpha.png", "IMG1.jpg", "img2.jpg", "img02b.jpg", "img10.jpg"]);
    }

    #[test]
    fn renumbers_in_natural_order() {
        let tmp = TempDir::new().unwrap();
        for (name, body) in [("b10.jpg", "ten"), ("b2.jpg", "two"), ("notes.txt", "keep")] {
            fs::write(tmp.path().join(name), body).unwrap();
        }
        let plan = run_rename(&options(tmp.path())).unwrap();
        assert_eq!(plan.sources, vec!["b2.jpg", "b10.jpg"]);
        assert_eq!(names(tmp.path()), vec!["cover-1.jpg", "cover-2.jpg", "notes.txt"]);
        assert_eq!(fs::read_to_string(tmp.path().join("cover-1.jpg")).unwrap(), "two");
        assert_eq!(fs::read_to_string(tmp.path().join("cover-2.jpg")).unwrap(), "ten");
    }

    #[test]
    fn overlapping_names_never_lose_files() {
        let tmp = TempDir::new().unwrap();
        for (name, body) in [("cover-2.jpg", "a"), ("cover-1.jpg", "b"), ("cover-10.jpg", "c")] {
            fs::write(tmp.path().join(name), body).unwrap();
        }
        let mut opts = options(tmp.path());
        opts.start = 2;
        run_rename(&opts).unwrap();
        assert_eq!(names(tmp.path()), vec!["cover-2.jpg", "cover-3.jpg", "cover-4.jpg"]);
        assert_eq!(fs::read_to_string(tmp.path().join("cover-2.jpg")).unwrap(), "b");
        assert_eq!(fs::read_to_string(tmp.path().join("cover-3.jpg")).unwrap(), "a");
        assert_eq!(fs::read_to_string(tmp.path().join("cover-4.jpg")).unwrap(), "c");
    }

    #[test]
    fn dry_run_changes_nothing() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("x.png"), "x").unwrap();
        let mut opts = options(tmp.path());
        opts.dry_run = true;
        opts.ext = "PNG".to_string();
        let plan = run_rename(&opts).unwrap();
        assert_eq!(plan.targets, vec!["cover-1.png"]);
        assert_eq!(names(tmp.path()), vec!["x.png"]);
    }

    #[test]
    fn rejects_bad_start_missing_dir_and_conflicts() {
        let tmp = TempDir::new().unwrap();
        let mut opts = options(tmp.path());
        opts.start = 0;
        assert!(plan_renames(&opts).is_err());

        assert!(plan_renames(&options(&tmp.path().join("missing"))).is_err());

        // An entry outside the rename set holding a target name blocks the plan.
        fs::write(tmp.path().join("a.jpg"), "a").unwrap();
        fs::write(tmp.path().join("b.jpg"), "b").unwrap();
        fs::create_dir(tmp.path().join("cover-2.jpg")).unwrap();
        assert!(plan_renames(&options(tmp.path())).is_err());
        let mut opts = options(tmp.path());
        opts.overwrite = true;
        assert!(plan_renames(&opts).is_ok());
    }
}
