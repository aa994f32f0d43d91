use std::fs;
use std::path::{Path, PathBuf};

use globset::GlobMatcher;
use walkdir::WalkDir;

use super::suppress::{compile_glob, has_glob_meta};
use crate::validator::check_relative_pattern;
use super::{Evaluator, Observer, Phase};

/// How far below the starting directory a glob can reach.
fn glob_depth(pattern: &str) -> usize {
    if pattern.contains("**") {
        usize::MAX
    } else {
        pattern.split('/').filter(|s| !s.is_empty()).count()
    }
}

/// `dir/pattern` if it exists and is reached without leaving `dir`: no
/// absolute path, no `.` or `..` segment, and no symlink before the last
/// segment. The last segment may itself be a symlink; it is never followed.
fn resolve_literal(dir: &Path, pattern: &str) -> Option<PathBuf> {
    if check_relative_pattern(pattern).is_err() {
        log::debug!("not resolving {pattern:?} outside {}", dir.display());
        return None;
    }

    let segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let (last, parents) = segments.split_last()?;

    let mut path = dir.to_path_buf();
    for segment in parents {
        path.push(segment);
        let meta = fs::symlink_metadata(&path).ok()?;
        if meta.file_type().is_symlink() {
            log::debug!("not following symlink {}", path.display());
            return None;
        }
        if !meta.is_dir() {
            return None;
        }
    }

    path.push(last);
    fs::symlink_metadata(&path).ok()?;
    Some(path)
}

impl<O: Observer> Evaluator<O> {
    /// Candidates for a `delete` target in `dir`, after ignore and skip.
    /// A skipped directory can itself be a target; nothing beneath it can.
    pub(super) fn match_targets(&mut self, dir: &Path, pattern: &str) -> Vec<PathBuf> {
        let candidates = if has_glob_meta(pattern) {
            self.expand_glob(dir, pattern, true)
        } else {
            resolve_literal(dir, pattern).into_iter().collect()
        };

        let mut kept = Vec::with_capacity(candidates.len());
        for path in candidates {
            let rel = self.relative(&path);
            if self.ignore.covers(rel) {
                log::debug!("ignored {}", path.display());
                continue;
            }
            if self.skip.covers_ancestor(rel) {
                log::debug!("inside skipped directory: {}", path.display());
                continue;
            }
            kept.push(path);
        }
        kept
    }

    /// Whether `pattern` names anything in `dir`. Ignore and skip do not apply:
    /// an ignored `.git` still counts as existing.
    pub(super) fn pattern_exists(&mut self, dir: &Path, pattern: &str) -> bool {
        let key = (dir.to_path_buf(), pattern.to_string());
        if let Some(&hit) = self.exists.get(&key) {
            return hit;
        }

        let hit = if has_glob_meta(pattern) {
            !self.expand_glob(dir, pattern, false).is_empty()
        } else {
            resolve_literal(dir, pattern).is_some()
        };

        self.exists.insert(key, hit);
        hit
    }

    fn glob_matcher(&mut self, dir: &Path, pattern: &str) -> Option<GlobMatcher> {
        if let Some(cached) = self.globs.get(pattern) {
            return cached.clone();
        }
        let matcher = match compile_glob(pattern) {
            Ok(m) => Some(m),
            Err(e) => {
                log::warn!("invalid glob {pattern:?}: {e}");
                self.observer.error(
                    dir,
                    &format!("invalid glob {pattern:?}: {e}"),
                    Phase::Evaluation,
                );
                None
            }
        };
        self.globs.insert(pattern.to_string(), matcher.clone());
        matcher
    }

    /// Files and directories under `dir` matching `pattern`, dotfiles included.
    /// With `prune`, the walk does not descend into ignored or skipped
    /// directories, and stops at the first match otherwise.
    fn expand_glob(&mut self, dir: &Path, pattern: &str, prune: bool) -> Vec<PathBuf> {
        let Some(matcher) = self.glob_matcher(dir, pattern) else {
            return Vec::new();
        };

        let mut matches = Vec::new();
        let mut walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(glob_depth(pattern))
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let at = e.path().unwrap_or(dir).to_path_buf();
                    log::warn!("glob walk error at {}: {e}", at.display());
                    self.observer.error(&at, &e.to_string(), Phase::Evaluation);
                    continue;
                }
            };

            let path = entry.path();
            let Ok(rel) = path.strip_prefix(dir) else {
                continue;
            };
            if matcher.is_match(rel) {
                matches.push(path.to_path_buf());
                if !prune {
                    break;
                }
            }

            if prune && entry.file_type().is_dir() && self.is_suppressed(path) {
                walker.skip_current_dir();
            }
        }

        matches
    }
}
