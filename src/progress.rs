//! Spinner shown on stderr while scanning and deleting.
//!
//! Only drawn when stderr is a terminal and debug logging is off; otherwise
//! every notification goes to the log instead.

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use sweep::{LogObserver, Observer, Phase, Rule};

const SPINNER_TICK_MS: u64 = 80;
const TEMPLATE: &str = "{spinner:.green} {prefix} {pos} {wide_msg:.dim}";

pub struct ProgressObserver {
    bar: Option<ProgressBar>,
    log: LogObserver,
}

impl ProgressObserver {
    pub fn new(verbose: bool) -> Self {
        if verbose || !std::io::stderr().is_terminal() {
            return Self::hidden();
        }

        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));

        Self {
            bar: Some(bar),
            log: LogObserver,
        }
    }

    pub fn hidden() -> Self {
        Self {
            bar: None,
            log: LogObserver,
        }
    }

    /// Restarts the counter under a new label.
    pub fn stage(&self, label: &'static str) {
        if let Some(bar) = &self.bar {
            bar.set_prefix(label);
            bar.set_position(0);
            bar.set_message("");
        }
    }

    /// Runs `f` with the spinner out of the way, for prompts and messages.
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        match &self.bar {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl Observer for ProgressObserver {
    fn scan_started(&self, rule_count: usize) {
        match &self.bar {
            Some(_) => self.stage("scanning"),
            None => self.log.scan_started(rule_count),
        }
    }

    fn directory_visited(&self, path: &Path) {
        match &self.bar {
            Some(bar) => bar.set_message(path.display().to_string()),
            None => self.log.directory_visited(path),
        }
    }

    fn target_found(&self, path: &Path, rule: &Rule, directory: &Path) {
        match &self.bar {
            Some(bar) => bar.inc(1),
            None => self.log.target_found(path, rule, directory),
        }
    }

    fn target_deleted(&self, path: &Path, is_dir: bool) {
        match &self.bar {
            Some(bar) => {
                bar.inc(1);
                bar.set_message(path.display().to_string());
            }
            None => self.log.target_deleted(path, is_dir),
        }
    }

    fn error(&self, path: &Path, error: &str, phase: Phase) {
        self.suspend(|| self.log.error(path, error, phase));
    }

    fn scan_completed(&self, count: usize) {
        if self.bar.is_none() {
            self.log.scan_completed(count);
        }
    }
}

impl Drop for ProgressObserver {
    fn drop(&mut self) {
        self.finish();
    }
}
