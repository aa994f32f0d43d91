use std::path::{Path, PathBuf};

use super::{Evaluator, Observer};
use crate::rules::{Condition, Location, Predicate};

impl<O: Observer> Evaluator<O> {
    /// Left to right; the right side is not evaluated when the left fails.
    pub(super) fn condition_holds(&mut self, condition: &Condition, dir: &Path) -> bool {
        match condition {
            Condition::Leaf { predicate } => self.predicate_holds(predicate, dir),
            Condition::And { left, right } => {
                self.condition_holds(left, dir) && self.condition_holds(right, dir)
            }
        }
    }

    fn predicate_holds(&mut self, predicate: &Predicate, dir: &Path) -> bool {
        match predicate {
            Predicate::Exists { location, pattern } => {
                let candidates = self.location_dirs(*location, dir);
                candidates.iter().any(|d| self.pattern_exists(d, pattern))
            }
            Predicate::Not { negated } => !self.predicate_holds(negated, dir),
        }
    }

    /// Directories a predicate at `dir` is checked in. Never leaves the base.
    pub(super) fn location_dirs(&mut self, location: Location, dir: &Path) -> Vec<PathBuf> {
        match location {
            Location::Here => vec![dir.to_path_buf()],
            Location::Parent => self.parent_within_base(dir).into_iter().collect(),
            Location::Parents => dir
                .ancestors()
                .skip(1)
                .take_while(|p| self.within_base(p))
                .map(Path::to_path_buf)
                .collect(),
            Location::Child => self.visible_subdirs(dir),
            Location::Children => self.descendants(dir),
            Location::Sibling => match self.parent_within_base(dir) {
                Some(parent) => self
                    .visible_subdirs(&parent)
                    .into_iter()
                    .filter(|d| d != dir)
                    .collect(),
                None => Vec::new(),
            },
        }
    }

    fn parent_within_base(&self, dir: &Path) -> Option<PathBuf> {
        dir.parent()
            .filter(|p| self.within_base(p))
            .map(Path::to_path_buf)
    }

    /// Immediate subdirectories that are not ignored.
    fn visible_subdirs(&mut self, dir: &Path) -> Vec<PathBuf> {
        let mut visible = Vec::new();
        for sub in self.list_subdirs(dir) {
            let rel = self.relative(&sub);
            if !self.ignore.covers(rel) {
                visible.push(sub);
            }
        }
        visible
    }

    /// Every directory below `dir`, leaving out ignored and skipped subtrees.
    fn descendants(&mut self, dir: &Path) -> Vec<PathBuf> {
        let mut out = Vec::new();
        let mut stack = vec![dir.to_path_buf()];
        while let Some(current) = stack.pop() {
            for child in self.list_subdirs(&current) {
                if self.is_suppressed(&child) {
                    continue;
                }
                out.push(child.clone());
                stack.push(child);
            }
        }
        out
    }
}
