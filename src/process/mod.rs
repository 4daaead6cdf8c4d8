//! Post-processing of published articles.
//!
//! Runs in two passes. The first loads every article and ranks tag
//! candidates over the whole corpus; the second walks articles in sorted
//! path order, spends the tag budget and rewrites files whose content
//! changed.

use crate::article::front_matter::{KEY_DATE, KEY_TAGS, KEY_UPDATED};
use crate::article::{assemble, extract_images, merge, protect_body, rewrite_image_urls};
use crate::article::{Article, DerivedFields};
use crate::cover::{choose_covers, CoverPool};
use crate::domain::{is_markdown, ProcessOptions};
use crate::error::{FileFailure, PipelineError};
use crate::history::{format_local_date, now_secs, FileTimes, GitHistory, HistorySource};
use crate::tags::{candidate_limit, extractor_for, tokenize, TagBudget};
use crate::utils::relative_posix;
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::fs;
use std::io::IsTerminal;
use std::path::Path;
use walkdir::WalkDir;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub processed: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failures: Vec<FileFailure>,
    pub unique_tags: usize,
}

/// Validate inputs, open history and process the target directory.
pub fn run_process(options: &ProcessOptions) -> Result<ProcessSummary> {
    if !options.target_dir.is_dir() {
        return Err(PipelineError::MissingTarget(options.target_dir.clone()).into());
    }

    let history = match &options.notes_dir {
        Some(notes) => {
            if !notes.is_dir() {
                return Err(PipelineError::MissingSource(notes.clone()).into());
            }
            Some(GitHistory::open(notes, options.date_kind, options.git_batch)?)
        }
        None => None,
    };

    let summary = process_articles(options, history.as_ref().map(|h| h as &dyn HistorySource))?;
    print_summary(&summary, &options.target_dir);
    Ok(summary)
}

pub fn print_summary(summary: &ProcessSummary, target: &Path) {
    println!(
        "processed: {} files (updated={}, unchanged={}, failed={}), target={}",
        summary.processed,
        summary.updated,
        summary.unchanged,
        summary.failures.len(),
        target.display()
    );
    for failure in &summary.failures {
        println!("  failed: {}: {}", failure.path, failure.reason);
    }
}

/// Markdown files under `root` as (relative path, absolute path), sorted.
fn collect_markdown(root: &Path) -> Result<Vec<(String, std::path::PathBuf)>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed walking {}", root.display()))?;
        if !entry.file_type().is_file() || !is_markdown(entry.path()) {
            continue;
        }
        if let Some(rel) = relative_posix(root, entry.path()) {
            files.push((rel, entry.path().to_path_buf()));
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

struct ProcessContext<'a> {
    options: &'a ProcessOptions,
    times: BTreeMap<String, FileTimes>,
    history_available: bool,
    fallback_secs: i64,
    pool: CoverPool,
}

impl ProcessContext<'_> {
    fn needs_dates(&self, article: &Article) -> bool {
        if self.options.force_regen {
            return true;
        }
        match &article.header {
            Some(fm) => !(fm.has(KEY_DATE) && fm.has(KEY_UPDATED)),
            None => true,
        }
    }

    fn resolve_times(&self, article: &Article) -> Result<FileTimes> {
        if let Some(times) = self.times.get(&article.relative) {
            return Ok(*times);
        }
        if self.history_available {
            if self.options.require_history {
                bail!("no git history for {}", article.relative);
            }
            tracing::warn!("[history] no git history for {}, using fallback time", article.relative);
        }
        Ok(FileTimes::at(self.fallback_secs))
    }

    /// Compute the new content for one article. `None` means unchanged.
    fn finalize(
        &self,
        article: &Article,
        candidates: &[String],
        budget: &mut TagBudget,
    ) -> Result<Option<String>> {
        let force = self.options.force_regen;
        let times = if self.needs_dates(article) { Some(self.resolve_times(article)?) } else { None };

        let body = rewrite_image_urls(&article.body, article.directory(), &self.options.image_root);
        let images = extract_images(&body);
        let covers = choose_covers(
            &images,
            self.options.cover_count,
            &article.relative,
            &self.pool,
            self.options.site_source.as_deref(),
        );
        let body = protect_body(&body, self.options.raw_wrap, self.options.escape_curly);

        let kept_tags = article.header.as_ref().filter(|fm| !force && fm.has(KEY_TAGS));
        let tags = match kept_tags {
            Some(fm) => fm.tags(),
            None => budget.select(candidates, self.options.tag_count),
        };

        let derived = DerivedFields {
            title: article.title(),
            date: times.map(|t| format_local_date(t.created)).unwrap_or_default(),
            updated: times.map(|t| format_local_date(t.updated)).unwrap_or_default(),
            covers,
            tags,
            categories: article.categories(),
        };

        let header = merge(article.header.as_ref(), &derived, force).render()?;
        let output = assemble(&header, &body, article.header.is_some());
        Ok((output != article.original).then_some(output))
    }
}

fn progress_bar(len: usize, enabled: bool) -> ProgressBar {
    if !enabled || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("[process] {bar:24} {pos}/{len} {wide_msg}") {
        bar.set_style(style);
    }
    bar
}

/// Process every article under the target directory.
pub fn process_articles(
    options: &ProcessOptions,
    history: Option<&dyn HistorySource>,
) -> Result<ProcessSummary> {
    let files = collect_markdown(&options.target_dir)?;
    let mut summary = ProcessSummary { processed: files.len(), ..ProcessSummary::default() };

    let mut articles = Vec::with_capacity(files.len());
    for (rel, path) in files {
        match Article::load(&path, &rel) {
            Ok(article) => articles.push(article),
            Err(e) => {
                tracing::warn!("[skip] {}: {:#}", rel, e);
                summary.failures.push(FileFailure::new(rel, format!("{e:#}")));
            }
        }
    }

    let regenerate: Vec<bool> =
        articles.iter().map(|a| options.force_regen || !a.is_complete()).collect();

    let ranked: Vec<Vec<String>> = match extractor_for(options.tag_method) {
        Some(extractor) if options.tag_count > 0 => {
            let docs: Vec<Vec<String>> = articles.iter().map(|a| tokenize(&a.body)).collect();
            tracing::info!("[tags] ranking {} documents with {}", docs.len(), extractor.name());
            extractor.rank_candidates(&docs, candidate_limit(options.tag_count))
        }
        _ => vec![Vec::new(); articles.len()],
    };

    let mut ctx = ProcessContext {
        options,
        times: BTreeMap::new(),
        history_available: history.is_some(),
        fallback_secs: options.timestamp.unwrap_or_else(now_secs),
        pool: CoverPool::new(&options.cover_dir, options.cover_pool, options.site_source.as_deref()),
    };

    if let Some(history) = history {
        let wanted: Vec<String> = articles
            .iter()
            .zip(&regenerate)
            .filter(|(a, regen)| **regen && ctx.needs_dates(a))
            .map(|(a, _)| a.relative.clone())
            .collect();
        if !wanted.is_empty() {
            ctx.times = history.file_times(&wanted)?;
            tracing::info!("[history] resolved {}/{} files", ctx.times.len(), wanted.len());
        }
    }

    // Tags that stay in place claim budget before any new tag is picked.
    let mut budget = TagBudget::new(options.tag_budget);
    for (article, regen) in articles.iter().zip(&regenerate) {
        if let Some(fm) = &article.header {
            if !*regen || (!options.force_regen && fm.has(KEY_TAGS)) {
                budget.seed(&fm.tags());
            }
        }
    }
    let progress = progress_bar(articles.len(), options.show_progress);

    for ((article, regen), candidates) in articles.iter().zip(&regenerate).zip(&ranked) {
        progress.set_message(article.relative.clone());
        progress.inc(1);

        if !regen {
            tracing::debug!("[keep] {} (header complete)", article.relative);
            summary.unchanged += 1;
            continue;
        }

        let outcome = ctx.finalize(article, candidates, &mut budget).and_then(|output| {
            match output {
                Some(content) => fs::write(&article.path, content)
                    .with_context(|| format!("Failed writing {}", article.path.display()))
                    .map(|_| true),
                None => Ok(false),
            }
        });
        match outcome {
            Ok(true) => {
                tracing::debug!("[write] {}", article.relative);
                summary.updated += 1;
            }
            Ok(false) => summary.unchanged += 1,
            Err(e) => {
                tracing::warn!("[skip] {}: {:#}", article.relative, e);
                summary.failures.push(FileFailure::new(article.relative.clone(), format!("{e:#}")));
            }
        }
    }
    progress.finish_and_clear();

    summary.unique_tags = budget.len();
    tracing::info!("[tags] unique={}/{}", budget.len(), budget.capacity());
    Ok(summary)
}
