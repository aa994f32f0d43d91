//! Ignore and skip share one matcher: a set of glob patterns plus a memo of
//! which relative paths are covered. They differ only in how the evaluator
//! asks: ignore drops anything [`covers`](SuppressionPolicy::covers), skip
//! drops candidates whose parent is covered.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};

/// Suffix that makes a pattern cover a whole directory.
const RECURSIVE_SUFFIX: &str = "/**";

pub(crate) fn compile_glob(pattern: &str) -> Result<GlobMatcher, globset::Error> {
    Ok(GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()?
        .compile_matcher())
}

/// Whether a pattern needs glob expansion rather than a plain existence check.
pub(crate) fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', ']', '{', '}'])
}

struct CompiledPattern {
    matcher: GlobMatcher,
    // `dir/**` compiled as `dir`
    stripped: Option<GlobMatcher>,
    // no separator: matched against each path component
    basename: bool,
}

pub struct SuppressionPolicy {
    patterns: Vec<CompiledPattern>,
    invalid: Vec<(String, String)>,
    covered: HashMap<PathBuf, bool>,
}

impl SuppressionPolicy {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut compiled = Vec::with_capacity(patterns.len());
        let mut invalid = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref().trim_end_matches('/');
            let matcher = match compile_glob(pattern) {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("invalid pattern {pattern:?}: {e}");
                    invalid.push((pattern.to_string(), e.to_string()));
                    continue;
                }
            };
            let stripped = pattern
                .strip_suffix(RECURSIVE_SUFFIX)
                .filter(|rest| !rest.is_empty())
                .and_then(|rest| compile_glob(rest).ok());

            compiled.push(CompiledPattern {
                matcher,
                stripped,
                basename: !pattern.contains('/'),
            });
        }

        Self {
            patterns: compiled,
            invalid,
            covered: HashMap::new(),
        }
    }

    /// Patterns that failed to compile, with the reason.
    pub fn invalid(&self) -> &[(String, String)] {
        &self.invalid
    }

    fn matches(&self, rel: &Path) -> bool {
        let name = rel.file_name().map(Path::new);
        self.patterns.iter().any(|p| {
            if p.basename {
                name.is_some_and(|n| p.matcher.is_match(n))
            } else {
                p.matcher.is_match(rel) || p.stripped.as_ref().is_some_and(|s| s.is_match(rel))
            }
        })
    }

    /// True when `rel` or any ancestor of it below the base is matched.
    /// `rel` is relative to the base directory; the base itself is never covered.
    pub fn covers(&mut self, rel: &Path) -> bool {
        if rel.as_os_str().is_empty() || self.patterns.is_empty() {
            return false;
        }
        if let Some(&hit) = self.covered.get(rel) {
            return hit;
        }
        let hit = rel.parent().is_some_and(|parent| self.covers(parent)) || self.matches(rel);
        self.covered.insert(rel.to_path_buf(), hit);
        hit
    }

    /// True when a proper ancestor of `rel` is covered. `rel` itself does not count.
    pub fn covers_ancestor(&mut self, rel: &Path) -> bool {
        rel.parent().is_some_and(|parent| self.covers(parent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(patterns: &[&str]) -> SuppressionPolicy {
        SuppressionPolicy::new(patterns)
    }

    #[test]
    fn test_basename_pattern_matches_at_any_depth() {
        let mut p = policy(&["node_modules"]);
        assert!(p.covers(Path::new("node_modules")));
        assert!(p.covers(Path::new("web/node_modules")));
        assert!(p.covers(Path::new("web/node_modules/react/index.js")));
        assert!(!p.covers(Path::new("web/node_modules_old")));
        assert!(!p.covers(Path::new("web")));
    }

    #[test]
    fn test_anchored_pattern_matches_from_base() {
        let mut p = policy(&["web/dist"]);
        assert!(p.covers(Path::new("web/dist")));
        assert!(p.covers(Path::new("web/dist/app.js")));
        assert!(!p.covers(Path::new("other/web/dist")));
    }

    #[test]
    fn test_recursive_suffix_covers_directory_itself() {
        let mut p = policy(&["build/**"]);
        assert!(p.covers(Path::new("build")));
        assert!(p.covers(Path::new("build/a/b")));
        assert!(!p.covers(Path::new("builds")));
    }

    #[test]
    fn test_glob_basename() {
        let mut p = policy(&["*.egg-info", ".venv*"]);
        assert!(p.covers(Path::new("pkg/foo.egg-info/PKG-INFO")));
        assert!(p.covers(Path::new(".venv3")));
        assert!(!p.covers(Path::new("pkg/foo.egg")));
    }

    #[test]
    fn test_covers_ancestor_excludes_self() {
        let mut p = policy(&["node_modules"]);
        assert!(!p.covers_ancestor(Path::new("node_modules")));
        assert!(p.covers_ancestor(Path::new("node_modules/react")));
        assert!(p.covers_ancestor(Path::new("node_modules/react/index.js")));
        assert!(!p.covers_ancestor(Path::new("src/index.js")));
    }

    #[test]
    fn test_base_is_never_covered() {
        let mut p = policy(&["*", "**"]);
        assert!(!p.covers(Path::new("")));
        assert!(p.covers(Path::new("anything")));
    }

    #[test]
    fn test_invalid_pattern_is_reported_not_fatal() {
        let mut p = policy(&["[unclosed", "dist"]);
        assert_eq!(p.invalid().len(), 1);
        assert_eq!(p.invalid()[0].0, "[unclosed");
        assert!(p.covers(Path::new("dist")));
    }

    #[test]
    fn test_empty_policy() {
        let mut p = policy(&[]);
        assert!(p.invalid().is_empty());
        assert!(!p.covers(Path::new("a/b")));
    }

    #[test]
    fn test_has_glob_meta() {
        assert!(has_glob_meta("*.log"));
        assert!(has_glob_meta("a/{b,c}"));
        assert!(has_glob_meta("file?.txt"));
        assert!(!has_glob_meta("Cargo.toml"));
        assert!(!has_glob_meta("src/main.rs"));
    }
}
