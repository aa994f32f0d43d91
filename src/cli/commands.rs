use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sweep::config::Config;
use sweep::validator::check_relative_pattern;
use sweep::{
    check_rules, parse_rules, validate_rules, Evaluator, ExecutionReport, Rule, ScanOptions,
    ValidationReport,
};

use crate::cli::errors::{CliError, CliResult};
use crate::cli::RuleArgs;
use crate::progress::ProgressObserver;

/// Everything a command needs before it touches a base directory:
/// the config, the parsed rules and the merged scan options.
#[derive(Debug, Clone)]
pub struct Session {
    pub config: Config,
    pub rules_path: PathBuf,
    pub rules: Vec<Rule>,
    pub options: ScanOptions,
}

impl Session {
    pub fn load(args: &RuleArgs, cwd: &Path) -> CliResult<Self> {
        let config = Config::load(args.config.as_deref(), cwd)?;

        let rules_path = match &args.rules {
            Some(path) => cwd.join(path),
            None => config.rules_path(cwd),
        };
        let text = fs::read_to_string(&rules_path).map_err(|source| CliError::RulesFile {
            path: rules_path.clone(),
            source,
        })?;
        let rules = parse_rules(&text).map_err(|source| CliError::Parse {
            path: rules_path.clone(),
            source,
        })?;

        for pattern in args.ignore.iter().chain(&args.skip) {
            check_relative_pattern(pattern)
                .map_err(|reason| CliError::invalid_input(format!("{pattern:?}: {reason}")))?;
        }

        let mut options = config.scan_options();
        options.ignore.extend(args.ignore.iter().cloned());
        options.skip.extend(args.skip.iter().cloned());
        options.skip_validation |= args.no_validate;

        log::debug!(
            "{} rule(s) from {}, ignore={:?} skip={:?}",
            rules.len(),
            rules_path.display(),
            options.ignore,
            options.skip
        );

        Ok(Self {
            config,
            rules_path,
            rules,
            options,
        })
    }

    fn evaluator<'p>(
        &self,
        dir: &Path,
        progress: &'p ProgressObserver,
    ) -> CliResult<Evaluator<&'p ProgressObserver>> {
        Ok(Evaluator::with_observer(
            dir,
            self.options.ignore.clone(),
            self.options.skip.clone(),
            progress,
        )?)
    }
}

/// No directories means the current one. Relative paths are taken from `cwd`.
fn base_dirs(dirs: Vec<PathBuf>, cwd: &Path) -> Vec<PathBuf> {
    if dirs.is_empty() {
        return vec![cwd.to_path_buf()];
    }
    dirs.into_iter().map(|dir| cwd.join(dir)).collect()
}

/// Command for listing what the rules select
#[derive(Debug, Clone)]
pub struct PlanCommand {
    pub dirs: Vec<PathBuf>,
    pub json: bool,
}

impl PlanCommand {
    pub fn new(dirs: Vec<PathBuf>, json: bool, cwd: &Path) -> Self {
        Self {
            dirs: base_dirs(dirs, cwd),
            json,
        }
    }

    pub fn execute(
        self,
        session: &Session,
        progress: &ProgressObserver,
        out: &mut impl Write,
    ) -> CliResult<BTreeSet<PathBuf>> {
        check_rules(&session.rules, &session.options)?;

        let mut targets = BTreeSet::new();
        for dir in &self.dirs {
            let _span = tracing::info_span!("plan", dir = %dir.display()).entered();
            let mut evaluator = session.evaluator(dir, progress)?;
            targets.extend(evaluator.evaluate(&session.rules));
        }
        progress.finish();

        if self.json {
            serde_json::to_writer_pretty(&mut *out, &targets)?;
            writeln!(out)?;
        } else {
            for path in &targets {
                writeln!(out, "{}", path.display())?;
            }
        }
        Ok(targets)
    }
}

/// Command for deleting what the rules select
#[derive(Debug, Clone)]
pub struct CleanCommand {
    pub dirs: Vec<PathBuf>,
    pub yes: bool,
    pub json: bool,
}

impl CleanCommand {
    pub fn new(dirs: Vec<PathBuf>, yes: bool, json: bool, cwd: &Path) -> Self {
        Self {
            dirs: base_dirs(dirs, cwd),
            yes,
            json,
        }
    }

    pub fn execute(
        self,
        session: &Session,
        progress: &ProgressObserver,
        out: &mut impl Write,
    ) -> CliResult<ExecutionReport> {
        check_rules(&session.rules, &session.options)?;

        let mut plans = Vec::with_capacity(self.dirs.len());
        for dir in &self.dirs {
            let _span = tracing::info_span!("scan", dir = %dir.display()).entered();
            let mut evaluator = session.evaluator(dir, progress)?;
            let targets = evaluator.evaluate(&session.rules);
            plans.push((evaluator, targets));
        }

        let total: usize = plans.iter().map(|(_, targets)| targets.len()).sum();
        if total == 0 {
            progress.finish();
            if self.json {
                serde_json::to_writer_pretty(&mut *out, &ExecutionReport::default())?;
                writeln!(out)?;
            } else {
                writeln!(out, "Nothing to delete")?;
            }
            return Ok(ExecutionReport::default());
        }

        if session.config.confirm && !self.yes && !self.confirm(&plans, total, progress)? {
            progress.finish();
            writeln!(out, "Nothing deleted")?;
            return Ok(ExecutionReport::default());
        }

        progress.stage("deleting");
        let mut report = ExecutionReport::default();
        for (mut evaluator, targets) in plans {
            let _span =
                tracing::info_span!("delete", dir = %evaluator.base_dir().display()).entered();
            report.merge(evaluator.execute(targets));
        }
        progress.finish();

        if self.json {
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{} items removed", report.deleted.len())?;
            for failure in &report.errors {
                eprintln!("failed: {}: {}", failure.path.display(), failure.error);
            }
        }

        if !report.is_success() {
            return Err(CliError::Deletion {
                failed: report.errors.len(),
            });
        }
        Ok(report)
    }

    fn confirm<O>(
        &self,
        plans: &[(Evaluator<O>, BTreeSet<PathBuf>)],
        total: usize,
        progress: &ProgressObserver,
    ) -> CliResult<bool>
    where
        O: sweep::Observer,
    {
        progress.suspend(|| {
            for (_, targets) in plans {
                for path in targets {
                    eprintln!("{}", path.display());
                }
            }
            match inquire::prompt_confirmation(format!("Delete {total} path(s)? (y/n)")) {
                inquire::error::InquireResult::Ok(answer) => Ok(answer),
                inquire::error::InquireResult::Err(err) => {
                    Err(CliError::invalid_input(err.to_string()))
                }
            }
        })
    }
}

#[derive(Debug, Serialize)]
struct CheckOutput<'a> {
    rules: Vec<String>,
    parsed: &'a [Rule],
    validation: &'a ValidationReport,
}

/// Command for parsing and validating the rule file
#[derive(Debug, Clone)]
pub struct CheckCommand {
    pub json: bool,
}

impl CheckCommand {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn execute(self, session: &Session, out: &mut impl Write) -> CliResult<ValidationReport> {
        let report = validate_rules(&session.rules);

        if self.json {
            let output = CheckOutput {
                rules: session.rules.iter().map(Rule::to_string).collect(),
                parsed: &session.rules,
                validation: &report,
            };
            serde_json::to_writer_pretty(&mut *out, &output)?;
            writeln!(out)?;
        } else {
            for rule in &session.rules {
                writeln!(out, "{rule}")?;
            }
            if report.valid {
                writeln!(
                    out,
                    "{}: {} rule(s) ok",
                    session.rules_path.display(),
                    session.rules.len()
                )?;
            }
        }

        if !report.valid {
            return Err(CliError::Sweep(sweep::SweepError::Validation(report)));
        }
        Ok(report)
    }
}
