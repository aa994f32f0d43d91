//! Static safety checks over parsed rules.
//!
//! Runs before any filesystem access. Only `delete` rules are checked:
//! `ignore` and `skip` can only narrow what gets deleted.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::rules::{Action, Condition, Predicate, Rule};

/// Patterns that would erase a whole subtree when left unconditioned.
pub const DANGEROUS_PATTERNS: &[&str] = &["*", "**", "*.*", "**/*", "**/*.*"];

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("`{rule}`: {message}")]
pub struct RuleViolation {
    pub rule: Rule,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<RuleViolation>,
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return write!(f, "all rules are valid");
        }
        write!(f, "{} unsafe rule(s):", self.errors.len())?;
        for violation in &self.errors {
            write!(f, "\n  {violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

pub fn is_dangerous(pattern: &str) -> bool {
    DANGEROUS_PATTERNS.contains(&pattern)
}

/// Checks that a pattern stays inside the directory it is resolved against:
/// not empty, not absolute, and free of `.` and `..` segments.
pub fn check_relative_pattern(pattern: &str) -> Result<(), &'static str> {
    if pattern.is_empty() {
        return Err("pattern is empty");
    }
    if pattern.starts_with('/') {
        return Err("pattern must be relative, not absolute");
    }
    if pattern.split('/').any(|seg| seg == "." || seg == "..") {
        return Err("pattern must not contain '.' or '..' segments");
    }
    Ok(())
}

fn predicate_patterns<'r>(predicate: &'r Predicate, out: &mut Vec<&'r str>) {
    match predicate {
        Predicate::Exists { pattern, .. } => out.push(pattern),
        Predicate::Not { negated } => predicate_patterns(negated, out),
    }
}

fn condition_patterns<'r>(condition: &'r Condition, out: &mut Vec<&'r str>) {
    match condition {
        Condition::Leaf { predicate } => predicate_patterns(predicate, out),
        Condition::And { left, right } => {
            condition_patterns(left, out);
            condition_patterns(right, out);
        }
    }
}

/// Any condition counts as a guard against a dangerous target; it is not
/// evaluated here. Every pattern of the rule must also stay relative.
pub fn validate_rule(rule: &Rule) -> Result<(), RuleViolation> {
    if rule.action != Action::Delete {
        return Ok(());
    }

    let mut patterns = vec![rule.target.as_str()];
    if let Some(condition) = &rule.condition {
        condition_patterns(condition, &mut patterns);
    }
    for pattern in patterns {
        if let Err(reason) = check_relative_pattern(pattern) {
            return Err(RuleViolation {
                rule: rule.clone(),
                message: format!("pattern {pattern:?}: {reason}"),
            });
        }
    }

    if rule.condition.is_some() || !is_dangerous(&rule.target) {
        return Ok(());
    }
    Err(RuleViolation {
        rule: rule.clone(),
        message: format!(
            "pattern {:?} would delete everything in every directory; \
             add a `when` condition or use a narrower pattern such as \"*.log\"",
            rule.target
        ),
    })
}

pub fn validate_rules(rules: &[Rule]) -> ValidationReport {
    let errors: Vec<RuleViolation> = rules
        .iter()
        .filter_map(|rule| validate_rule(rule).err())
        .collect();
    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}
