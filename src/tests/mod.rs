use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

mod scenarios;

/// Builds a tree under a fresh temp dir. Entries ending in `/` are directories.
/// Returns the canonical base so expected paths compare equal on every platform.
pub fn tree(entries: &[&str]) -> (TempDir, PathBuf) {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    for entry in entries {
        let path = tmp.path().join(entry);
        if entry.ends_with('/') {
            fs::create_dir_all(&path).unwrap();
        } else {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "").unwrap();
        }
    }
    let base = fs::canonicalize(tmp.path()).unwrap();
    (tmp, base)
}

/// Target set as base-relative strings, in order.
pub fn relative(base: &Path, targets: &BTreeSet<PathBuf>) -> Vec<String> {
    targets
        .iter()
        .map(|p| p.strip_prefix(base).unwrap().to_string_lossy().into_owned())
        .collect()
}
