//! Progress notifications emitted while scanning and deleting.
//!
//! Observers never influence results. Every method defaults to a no-op, so an
//! implementation only overrides what it cares about.

use std::path::Path;

use serde::Serialize;

use crate::rules::Rule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Evaluation,
    Deletion,
}

pub trait Observer {
    fn scan_started(&self, _rule_count: usize) {}

    fn directory_visited(&self, _path: &Path) {}

    fn target_found(&self, _path: &Path, _rule: &Rule, _directory: &Path) {}

    fn target_deleted(&self, _path: &Path, _is_dir: bool) {}

    fn error(&self, _path: &Path, _error: &str, _phase: Phase) {}

    fn scan_completed(&self, _count: usize) {}
}

/// The default observer. Compiles away entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Forwards every notification to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn scan_started(&self, rule_count: usize) {
        log::info!("scan started rules={rule_count}");
    }

    fn directory_visited(&self, path: &Path) {
        log::trace!("visit {}", path.display());
    }

    fn target_found(&self, path: &Path, rule: &Rule, directory: &Path) {
        log::debug!(
            "found {} rule=`{rule}` dir={}",
            path.display(),
            directory.display()
        );
    }

    fn target_deleted(&self, path: &Path, is_dir: bool) {
        let kind = if is_dir { "dir" } else { "file" };
        log::info!("deleted {kind} {}", path.display());
    }

    fn error(&self, path: &Path, error: &str, phase: Phase) {
        log::warn!("{phase:?} error at {}: {error}", path.display());
    }

    fn scan_completed(&self, count: usize) {
        log::info!("scan completed targets={count}");
    }
}

impl<T: Observer + ?Sized> Observer for &T {
    fn scan_started(&self, rule_count: usize) {
        (**self).scan_started(rule_count)
    }

    fn directory_visited(&self, path: &Path) {
        (**self).directory_visited(path)
    }

    fn target_found(&self, path: &Path, rule: &Rule, directory: &Path) {
        (**self).target_found(path, rule, directory)
    }

    fn target_deleted(&self, path: &Path, is_dir: bool) {
        (**self).target_deleted(path, is_dir)
    }

    fn error(&self, path: &Path, error: &str, phase: Phase) {
        (**self).error(path, error, phase)
    }

    fn scan_completed(&self, count: usize) {
        (**self).scan_completed(count)
    }
}
