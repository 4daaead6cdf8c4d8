//! git2-backed history lookup.
//!
//! History is walked newest-first. Each non-merge commit is diffed against
//! its first parent with rename detection, so a file's older names are
//! picked up as the walk crosses the commit that renamed it.

use super::{FileTimes, HistorySource};
use crate::domain::DateKind;
use crate::error::PipelineError;
use crate::utils::relative_posix;
use anyhow::{Context, Result};
use git2::{Commit, Delta, DiffFindOptions, Repository, Sort};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

pub struct GitHistory {
    repo: Repository,
    /// Notes directory relative to the work tree, `""` at the top.
    prefix: String,
    date_kind: DateKind,
    batch: bool,
    markdown: GlobSet,
}

impl std::fmt::Debug for GitHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHistory")
            .field("prefix", &self.prefix)
            .field("date_kind", &self.date_kind)
            .field("batch", &self.batch)
            .finish()
    }
}

impl GitHistory {
    /// Open the repository containing `notes_dir`.
    ///
    /// Anything other than a non-bare working copy is a configuration error.
    pub fn open(notes_dir: &Path, date_kind: DateKind, batch: bool) -> Result<Self> {
        let not_a_repo = |reason: String| PipelineError::NotAGitRepository {
            path: notes_dir.to_path_buf(),
            reason,
        };

        let repo = Repository::discover(notes_dir).map_err(|e| not_a_repo(e.message().to_string()))?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| not_a_repo("repository has no working tree".to_string()))?;

        let workdir = workdir.canonicalize().unwrap_or_else(|_| workdir.to_path_buf());
        let notes = notes_dir.canonicalize().unwrap_or_else(|_| notes_dir.to_path_buf());
        let prefix = match relative_posix(&workdir, &notes) {
            Some(rel) if rel == "." => String::new(),
            Some(rel) => rel,
            None => return Err(not_a_repo("outside the repository work tree".to_string()).into()),
        };

        tracing::debug!("[git] repo={} prefix='{}'", workdir.display(), prefix);
        Ok(Self { repo, prefix, date_kind, batch, markdown: markdown_globs()? })
    }

    fn repo_path(&self, rel: &str) -> String {
        if self.prefix.is_empty() {
            rel.to_string()
        } else {
            format!("{}/{}", self.prefix, rel)
        }
    }

    fn commit_time(&self, commit: &Commit<'_>) -> i64 {
        match self.date_kind {
            DateKind::Author => commit.author().when().seconds(),
            DateKind::Committer => commit.committer().when().seconds(),
        }
    }

    /// Walk history once for every path in `relatives`.
    fn walk(&self, relatives: &[String]) -> Result<BTreeMap<String, FileTimes>> {
        let mut found: BTreeMap<String, FileTimes> = BTreeMap::new();
        if relatives.is_empty() {
            return Ok(found);
        }

        // repo path as seen at the current point of the walk -> article key
        let mut aliases: HashMap<String, String> =
            relatives.iter().map(|rel| (self.repo_path(rel), rel.clone())).collect();

        let mut revwalk = self.repo.revwalk().context("Failed to start history walk")?;
        if revwalk.push_head().is_err() {
            // Unborn HEAD: nothing committed yet.
            return Ok(found);
        }
        revwalk.set_sorting(Sort::TIME).context("Failed to sort history walk")?;

        let mut find = DiffFindOptions::new();
        find.renames(true);

        for oid in revwalk {
            let oid = oid.context("Failed to read commit id")?;
            let commit = self.repo.find_commit(oid).context("Failed to read commit")?;
            if commit.parent_count() > 1 {
                continue;
            }
            let tree = commit.tree().context("Failed to read commit tree")?;
            let parent_tree = match commit.parent(0) {
                Ok(parent) => Some(parent.tree().context("Failed to read parent tree")?),
                Err(_) => None,
            };
            let mut diff = self
                .repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
                .context("Failed to diff commit")?;
            diff.find_similar(Some(&mut find)).context("Failed to detect renames")?;

            let when = self.commit_time(&commit);
            for delta in diff.deltas() {
                let new_path = delta.new_file().path().and_then(|p| p.to_str());
                let old_path = delta.old_file().path().and_then(|p| p.to_str());
                let touched = match delta.status() {
                    Delta::Deleted => old_path,
                    _ => new_path,
                };
                let Some(touched) = touched else { continue };
                if !self.markdown.is_match(touched) {
                    continue;
                }
                let Some(key) = aliases.get(touched).cloned() else { continue };

                found
                    .entry(key.clone())
                    .and_modify(|t| t.observe(when))
                    .or_insert_with(|| FileTimes::at(when));

                if delta.status() == Delta::Renamed {
                    if let Some(old) = old_path.filter(|p| *p != touched) {
                        aliases.remove(touched);
                        aliases.insert(old.to_string(), key);
                    }
                }
            }
        }
        Ok(found)
    }
}

impl HistorySource for GitHistory {
    fn file_times(&self, relatives: &[String]) -> Result<BTreeMap<String, FileTimes>> {
        if self.batch {
            return self.walk(relatives);
        }
        let mut out = BTreeMap::new();
        for rel in relatives {
            out.extend(self.walk(std::slice::from_ref(rel))?);
        }
        Ok(out)
    }
}

fn markdown_globs() -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in ["**/*.md", "**/*.markdown"] {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("Invalid glob: {pattern}"))?;
        builder.add(glob);
    }
    builder.build().context("Failed to build markdown globs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Oid, Signature, Time};
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        repo: Repository,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let repo = Repository::init(dir.path()).unwrap();
            Self { dir, repo }
        }

        fn path(&self) -> &Path {
            self.dir.path()
        }

        /// Apply writes (`Some`) and removals (`None`), then commit at `secs`.
        fn commit(&self, secs: i64, changes: &[(&str, Option<&str>)]) -> Oid {
            let mut index = self.repo.index().unwrap();
            for (rel, content) in changes {
                let abs = self.path().join(rel);
                match content {
                    Some(text) => {
                        fs::create_dir_all(abs.parent().unwrap()).unwrap();
                        fs::write(&abs, text).unwrap();
                        index.add_path(Path::new(rel)).unwrap();
                    }
                    None => {
                        fs::remove_file(&abs).unwrap();
                        index.remove_path(Path::new(rel)).unwrap();
                    }
                }
            }
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = self.repo.find_tree(tree_id).unwrap();
            let author = Signature::new("Author", "a@example.com", &Time::new(secs, 0)).unwrap();
            let committer =
                Signature::new("Committer", "c@example.com", &Time::new(secs + 5, 0)).unwrap();
            let parents: Vec<Commit<'_>> = match self.repo.head() {
                Ok(head) => vec![head.peel_to_commit().unwrap()],
                Err(_) => Vec::new(),
            };
            let parent_refs: Vec<&Commit<'_>> = parents.iter().collect();
            self.repo
                .commit(Some("HEAD"), &author, &committer, "change", &tree, &parent_refs)
                .unwrap()
        }
    }

    const BODY: &str = "# Title\n\nSome stable paragraph that keeps renames detectable.\nline two\nline three\n";

    fn rels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn created_and_updated_span_all_commits() {
        let fx = Fixture::new();
        fx.commit(1_000, &[("notes/Java/a.md", Some(BODY))]);
        fx.commit(2_000, &[("notes/Java/b.md", Some(BODY))]);
        fx.commit(3_000, &[("notes/Java/a.md", Some("# changed\n"))]);

        let history = GitHistory::open(&fx.path().join("notes"), DateKind::Author, true).unwrap();
        let times = history.file_times(&rels(&["Java/a.md", "Java/b.md", "Java/none.md"])).unwrap();
        assert_eq!(times["Java/a.md"], FileTimes { created: 1_000, updated: 3_000 });
        assert_eq!(times["Java/b.md"], FileTimes::at(2_000));
        assert!(!times.contains_key("Java/none.md"));
    }

    #[test]
    fn committer_dates_are_selectable() {
        let fx = Fixture::new();
        fx.commit(1_000, &[("notes/a.md", Some(BODY))]);
        let history =
            GitHistory::open(&fx.path().join("notes"), DateKind::Committer, true).unwrap();
        let times = history.file_times(&rels(&["a.md"])).unwrap();
        assert_eq!(times["a.md"], FileTimes::at(1_005));
    }

    #[test]
    fn follows_renames() {
        let fx = Fixture::new();
        fx.commit(1_000, &[("notes/old.md", Some(BODY))]);
        fx.commit(2_000, &[("notes/old.md", None), ("notes/Topic/new.md", Some(BODY))]);
        fx.commit(3_000, &[("notes/other.md", Some("unrelated\n"))]);

        let history = GitHistory::open(&fx.path().join("notes"), DateKind::Author, true).unwrap();
        let times = history.file_times(&rels(&["Topic/new.md"])).unwrap();
        assert_eq!(times["Topic/new.md"], FileTimes { created: 1_000, updated: 2_000 });
    }

    #[test]
    fn batch_and_per_file_agree() {
        let fx = Fixture::new();
        fx.commit(1_000, &[("notes/a.md", Some(BODY)), ("notes/b.md", Some("b\n"))]);
        fx.commit(2_000, &[("notes/a.md", None), ("notes/c.md", Some(BODY))]);
        fx.commit(3_000, &[("notes/b.md", Some("b2\n"))]);
        fx.commit(4_000, &[("notes/img.png", Some("png"))]);

        let notes = fx.path().join("notes");
        let wanted = rels(&["b.md", "c.md"]);
        let batch = GitHistory::open(&notes, DateKind::Author, true).unwrap();
        let single = GitHistory::open(&notes, DateKind::Author, false).unwrap();
        let from_batch = batch.file_times(&wanted).unwrap();
        assert_eq!(from_batch, single.file_times(&wanted).unwrap());
        assert_eq!(from_batch["c.md"], FileTimes { created: 1_000, updated: 2_000 });
        assert_eq!(from_batch["b.md"], FileTimes { created: 1_000, updated: 3_000 });
    }

    #[test]
    fn non_repository_is_a_configuration_error() {
        let dir = TempDir::new().unwrap();
        let err = GitHistory::open(dir.path(), DateKind::Author, true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::NotAGitRepository { .. })
        ));
    }

    #[test]
    fn empty_repository_has_no_history() {
        let fx = Fixture::new();
        fs::create_dir_all(fx.path().join("notes")).unwrap();
        let history = GitHistory::open(&fx.path().join("notes"), DateKind::Author, true).unwrap();
        assert!(history.file_times(&rels(&["a.md"])).unwrap().is_empty());
    }
}
