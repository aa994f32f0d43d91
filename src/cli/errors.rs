use std::path::PathBuf;

use sweep::{ParseError, SweepError};
use thiserror::Error;

/// Errors surfaced by the command line front end
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("cannot read rules from {}: {source}", path.display())]
    RulesFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Parse { path: PathBuf, source: ParseError },

    #[error(transparent)]
    Sweep(#[from] SweepError),

    #[error("{failed} path(s) could not be deleted")]
    Deletion { failed: usize },

    #[error("Output error: {message}")]
    Output { message: String },
}

impl CliError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::output(err.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::output(err.to_string())
    }
}
