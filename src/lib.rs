//! Declarative filesystem cleanup.
//!
//! Rule text is parsed into [`Rule`]s, checked by the [`validator`], and run
//! against a directory tree by an [`Evaluator`] to produce a deletion plan,
//! which can then be executed.
//!
//! ```no_run
//! use sweep::{evaluate, parse_rules, ScanOptions};
//!
//! let rules = parse_rules("skip node_modules\ndelete target when exists Cargo.toml")?;
//! let targets = evaluate(&rules, "/home/me/src", &ScanOptions::default())?;
//! for path in &targets {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), sweep::SweepError>(())
//! ```

pub mod config;
pub mod engine;
pub mod errors;
pub mod rules;
pub mod validator;

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub use engine::{
    DeletionFailure, Evaluator, ExecutionReport, LogObserver, NoopObserver, Observer, Phase,
};
pub use errors::{SweepError, SweepResult};
pub use rules::{parse_rules, Action, Condition, Location, ParseError, Predicate, Rule};
pub use validator::{is_dangerous, validate_rule, validate_rules, RuleViolation, ValidationReport};

/// Caller-side knobs shared by [`evaluate`] and [`execute`].
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Extra ignore patterns, applied after the rules' own `ignore` lines.
    pub ignore: Vec<String>,
    /// Extra skip patterns, applied after the rules' own `skip` lines.
    pub skip: Vec<String>,
    /// Run even when the validator rejects a rule.
    pub skip_validation: bool,
}

/// Validation gate run before any filesystem access.
pub fn check_rules(rules: &[Rule], options: &ScanOptions) -> SweepResult<()> {
    if options.skip_validation {
        log::debug!("validation skipped");
        return Ok(());
    }
    let report = validate_rules(rules);
    if !report.valid {
        return Err(SweepError::Validation(report));
    }
    Ok(())
}

/// Paths the rules select under `base_dir`.
pub fn evaluate(
    rules: &[Rule],
    base_dir: impl AsRef<Path>,
    options: &ScanOptions,
) -> SweepResult<BTreeSet<PathBuf>> {
    evaluate_all_with(rules, [base_dir], options, NoopObserver)
}

/// Union of [`evaluate`] over several base directories, one after another,
/// each with its own [`Evaluator`].
pub fn evaluate_all<P: AsRef<Path>>(
    rules: &[Rule],
    base_dirs: impl IntoIterator<Item = P>,
    options: &ScanOptions,
) -> SweepResult<BTreeSet<PathBuf>> {
    evaluate_all_with(rules, base_dirs, options, NoopObserver)
}

pub fn evaluate_all_with<P: AsRef<Path>, O: Observer>(
    rules: &[Rule],
    base_dirs: impl IntoIterator<Item = P>,
    options: &ScanOptions,
    observer: O,
) -> SweepResult<BTreeSet<PathBuf>> {
    check_rules(rules, options)?;

    let mut targets = BTreeSet::new();
    for base_dir in base_dirs {
        let mut evaluator = Evaluator::with_observer(
            base_dir,
            options.ignore.clone(),
            options.skip.clone(),
            &observer,
        )?;
        targets.extend(evaluator.evaluate(rules));
    }
    Ok(targets)
}

/// Evaluates and then deletes everything selected under `base_dir`.
pub fn execute(
    rules: &[Rule],
    base_dir: impl AsRef<Path>,
    options: &ScanOptions,
) -> SweepResult<ExecutionReport> {
    check_rules(rules, options)?;

    let mut evaluator = Evaluator::new(base_dir, options.ignore.clone(), options.skip.clone())?;
    let targets = evaluator.evaluate(rules);
    Ok(evaluator.execute(targets))
}
