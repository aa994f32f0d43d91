//! Rule evaluation against a directory tree, and deletion of the result.
//!
//! An [`Evaluator`] is bound to one base directory. Everything it resolves
//! stays inside that directory. Its caches assume the tree does not change
//! between [`Evaluator::evaluate`] and [`Evaluator::execute`]; build a fresh
//! evaluator when it might have.

mod condition;
pub mod events;
mod execute;
mod suppress;
mod targets;

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::GlobMatcher;

use crate::errors::{SweepError, SweepResult};
use crate::rules::{Action, Rule};

pub use events::{LogObserver, NoopObserver, Observer, Phase};
pub use execute::{DeletionFailure, ExecutionReport};
pub use suppress::SuppressionPolicy;

pub struct Evaluator<O: Observer = NoopObserver> {
    base: PathBuf,
    extra_ignore: Vec<String>,
    extra_skip: Vec<String>,
    ignore: SuppressionPolicy,
    skip: SuppressionPolicy,
    // raw subdirectory listings, before any suppression
    subdirs: HashMap<PathBuf, Vec<PathBuf>>,
    exists: HashMap<(PathBuf, String), bool>,
    globs: HashMap<String, Option<GlobMatcher>>,
    observer: O,
}

impl Evaluator<NoopObserver> {
    pub fn new(
        base_dir: impl AsRef<Path>,
        ignore: Vec<String>,
        skip: Vec<String>,
    ) -> SweepResult<Self> {
        Self::with_observer(base_dir, ignore, skip, NoopObserver)
    }
}

impl<O: Observer> Evaluator<O> {
    /// `ignore` and `skip` are caller-supplied patterns; they are appended to
    /// the patterns of `ignore`/`skip` rules at evaluation time.
    pub fn with_observer(
        base_dir: impl AsRef<Path>,
        ignore: Vec<String>,
        skip: Vec<String>,
        observer: O,
    ) -> SweepResult<Self> {
        let base_dir = base_dir.as_ref();
        let base = fs::canonicalize(base_dir).map_err(|source| SweepError::BaseDir {
            path: base_dir.to_path_buf(),
            source,
        })?;
        if !base.is_dir() {
            return Err(SweepError::BaseDir {
                path: base_dir.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            });
        }

        Ok(Self {
            ignore: SuppressionPolicy::new(&ignore),
            skip: SuppressionPolicy::new(&skip),
            base,
            extra_ignore: ignore,
            extra_skip: skip,
            subdirs: HashMap::new(),
            exists: HashMap::new(),
            globs: HashMap::new(),
            observer,
        })
    }

    /// The canonical base directory.
    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// Runs every `delete` rule in every visited directory and returns the
    /// deduplicated set of absolute paths to remove. Filesystem errors along
    /// the way are reported to the observer and treated as "no match".
    pub fn evaluate(&mut self, rules: &[Rule]) -> BTreeSet<PathBuf> {
        self.observer.scan_started(rules.len());
        self.load_policies(rules);

        let deletes: Vec<&Rule> = rules.iter().filter(|r| r.action == Action::Delete).collect();
        let mut found = BTreeSet::new();

        for dir in self.walk() {
            self.observer.directory_visited(&dir);
            for rule in &deletes {
                if let Some(condition) = &rule.condition {
                    if !self.condition_holds(condition, &dir) {
                        continue;
                    }
                }
                for path in self.match_targets(&dir, &rule.target) {
                    if found.insert(path.clone()) {
                        self.observer.target_found(&path, rule, &dir);
                    }
                }
            }
        }

        log::info!("{}: {} target(s)", self.base.display(), found.len());
        self.observer.scan_completed(found.len());
        found
    }

    fn load_policies(&mut self, rules: &[Rule]) {
        let patterns_for = |action: Action, extra: &[String]| -> Vec<String> {
            rules
                .iter()
                .filter(|r| r.action == action)
                .map(|r| r.target.clone())
                .chain(extra.iter().cloned())
                .collect()
        };
        self.ignore = SuppressionPolicy::new(&patterns_for(Action::Ignore, &self.extra_ignore));
        self.skip = SuppressionPolicy::new(&patterns_for(Action::Skip, &self.extra_skip));

        let invalid: Vec<(String, String)> = self
            .ignore
            .invalid()
            .iter()
            .chain(self.skip.invalid())
            .cloned()
            .collect();
        for (pattern, reason) in invalid {
            self.observer.error(
                &self.base,
                &format!("invalid pattern {pattern:?}: {reason}"),
                Phase::Evaluation,
            );
        }
    }

    /// All directories the scan visits, base first, in a stable order.
    /// Ignored and skipped directories are neither listed nor descended into.
    fn walk(&mut self) -> Vec<PathBuf> {
        let mut visited = Vec::new();
        let mut stack = vec![self.base.clone()];

        while let Some(dir) = stack.pop() {
            let children: Vec<PathBuf> = self
                .list_subdirs(&dir)
                .into_iter()
                .filter(|child| !self.is_suppressed(child))
                .collect();
            visited.push(dir);
            stack.extend(children.into_iter().rev());
        }

        visited
    }

    fn is_suppressed(&mut self, path: &Path) -> bool {
        let rel = self.relative(path);
        self.ignore.covers(rel) || self.skip.covers(rel)
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.base).unwrap_or(path)
    }

    fn within_base(&self, path: &Path) -> bool {
        path.starts_with(&self.base)
    }

    /// Immediate subdirectories of `dir`, sorted. Symlinks are not followed.
    fn list_subdirs(&mut self, dir: &Path) -> Vec<PathBuf> {
        if let Some(cached) = self.subdirs.get(dir) {
            return cached.clone();
        }

        let mut dirs = Vec::new();
        match fs::read_dir(dir) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    if entry.file_type().is_ok_and(|t| t.is_dir()) {
                        dirs.push(entry.path());
                    }
                }
            }
            Err(e) => {
                log::warn!("cannot read {}: {e}", dir.display());
                self.observer.error(dir, &e.to_string(), Phase::Evaluation);
            }
        }
        dirs.sort();

        self.subdirs.insert(dir.to_path_buf(), dirs.clone());
        dirs
    }
}
