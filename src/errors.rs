use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error raised while deriving the similarity weight of one text pair.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WeightError {
    #[error("text field is empty, length ratio is undefined")]
    EmptyText,
}

/// Error type for dataset building, training and prediction failures.
///
/// Every variant is fatal for a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("io failure on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("malformed record at {path}:{line}: {reason}")]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("holdout fraction must be in (0, 1], got {0}")]
    InvalidHoldout(f32),
    #[error("record '{0}' has no label, training and evaluation need labeled data")]
    MissingLabel(String),
    #[error("dataset '{0}' has no records")]
    EmptyDataset(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("record export failed: {0}")]
    Export(#[from] arrow::error::ArrowError),
    #[error("failed to install tracing subscriber: {0}")]
    Logging(String),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(
        path: impl Into<PathBuf>,
        line: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedRecord {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
