use std::path::PathBuf;

use crate::rules::ParseError;
use crate::validator::ValidationReport;

#[derive(thiserror::Error, Debug)]
pub enum SweepError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Validation(ValidationReport),

    #[error("invalid base directory {}: {source}", path.display())]
    BaseDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl SweepError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

pub type SweepResult<T> = Result<T, SweepError>;
