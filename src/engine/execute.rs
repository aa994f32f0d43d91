use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{Evaluator, Observer, Phase};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub deleted: Vec<PathBuf>,
    pub errors: Vec<DeletionFailure>,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn merge(&mut self, other: ExecutionReport) {
        self.deleted.extend(other.deleted);
        self.errors.extend(other.errors);
    }
}

fn depth(path: &Path) -> usize {
    path.components().count()
}

impl<O: Observer> Evaluator<O> {
    /// Deletes `targets` deepest first. Paths already gone (usually removed
    /// with an ancestor) are skipped silently. A failure on one path never
    /// stops the others.
    pub fn execute(&mut self, targets: impl IntoIterator<Item = PathBuf>) -> ExecutionReport {
        let mut targets: Vec<PathBuf> = targets.into_iter().collect();
        targets.sort_by(|a, b| depth(b).cmp(&depth(a)).then_with(|| a.cmp(b)));
        targets.dedup();

        let mut report = ExecutionReport::default();
        for path in targets {
            match remove(&path) {
                Ok(Some(is_dir)) => {
                    log::info!("removed {}", path.display());
                    self.observer.target_deleted(&path, is_dir);
                    report.deleted.push(path);
                }
                Ok(None) => {
                    log::debug!("already gone: {}", path.display());
                }
                Err(e) => {
                    log::warn!("failed to remove {}: {e}", path.display());
                    self.observer.error(&path, &e.to_string(), Phase::Deletion);
                    report.errors.push(DeletionFailure {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }
}

/// `Ok(None)` when there was nothing to remove, otherwise whether it was a directory.
fn remove(path: &Path) -> io::Result<Option<bool>> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    if meta.is_dir() {
        fs::remove_dir_all(path)?;
        Ok(Some(true))
    } else {
        fs::remove_file(path)?;
        Ok(Some(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    #[test]
    fn test_depth_order() {
        let mut v = vec![PathBuf::from("/a"), PathBuf::from("/a/b/c"), PathBuf::from("/a/b")];
        v.sort_by(|a, b| depth(b).cmp(&depth(a)).then_with(|| a.cmp(b)));
        assert_eq!(
            v,
            vec![PathBuf::from("/a/b/c"), PathBuf::from("/a/b"), PathBuf::from("/a")]
        );
    }

    #[test]
    fn test_parent_and_child_in_same_batch() {
        let tmp = TempDir::new().unwrap();
        let mut ev = Evaluator::new(tmp.path(), vec![], vec![]).unwrap();
        let base = ev.base_dir().to_path_buf();

        let dir = base.join("build");
        let file = dir.join("out.o");
        fs::create_dir_all(&dir).unwrap();
        fs::write(&file, "").unwrap();

        let targets: BTreeSet<PathBuf> = [dir.clone(), file.clone()].into_iter().collect();
        let report = ev.execute(targets);

        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert!(report.deleted.contains(&dir));
        assert!(!dir.exists());
    }

    #[test]
    fn test_missing_target_is_not_an_error() {
        let tmp = TempDir::new().unwrap();
        let mut ev = Evaluator::new(tmp.path(), vec![], vec![]).unwrap();
        let gone = ev.base_dir().join("gone");

        let report = ev.execute(vec![gone]);
        assert!(report.is_success());
        assert!(report.deleted.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_does_not_stop_batch() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let mut ev = Evaluator::new(tmp.path(), vec![], vec![]).unwrap();
        let base = ev.base_dir().to_path_buf();

        let locked = base.join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("file"), "").unwrap();
        let free = base.join("free.txt");
        fs::write(&free, "").unwrap();

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
        // root ignores directory permissions
        let writable = fs::write(locked.join("canary"), "").is_ok();

        let report = ev.execute(vec![locked.join("file"), free.clone()]);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(report.deleted.contains(&free));
        if !writable {
            assert_eq!(report.errors.len(), 1);
            assert_eq!(report.errors[0].path, locked.join("file"));
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_is_removed_not_followed() {
        let tmp = TempDir::new().unwrap();
        let mut ev = Evaluator::new(tmp.path(), vec![], vec![]).unwrap();
        let base = ev.base_dir().to_path_buf();

        let real = base.join("real");
        fs::create_dir(&real).unwrap();
        fs::write(real.join("data"), "").unwrap();

        let link = base.join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        let report = ev.execute(vec![link.clone()]);
        assert!(report.is_success());
        assert!(fs::symlink_metadata(&link).is_err());
        assert!(real.join("data").exists());
    }
}
