use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::cutoff::CutoffError;

/// Why a single manifest could not be turned into a plugin.
///
/// Always local to that manifest: the registry logs it and keeps scanning.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("'{0}' is not specified")]
    MissingField(&'static str),

    #[error("'{0}' must list at least one value")]
    EmptySet(&'static str),

    #[error("'{field}' is invalid: {message}")]
    Invalid { field: &'static str, message: String },

    #[error("entry-point mode '{0}' has to be either 'Python' or 'Docker'")]
    UnknownMode(String),

    #[error("cannot resolve variation type '{0}'")]
    UnknownVariationType(String),

    #[error("cannot resolve reference genome '{0}'")]
    UnknownReferenceGenome(String),

    #[error("invalid cutoff: {0}")]
    Cutoff(#[from] CutoffError),

    #[error("unknown {direction} format '{tag}'")]
    UnknownFormat { direction: &'static str, tag: String },

    #[error("invalid {direction} format arguments: {message}")]
    FormatArgs { direction: &'static str, message: String },

    #[error("specified file {0} does not exist")]
    MissingFile(PathBuf),
}

/// Why invoking one plugin failed. Recorded against that plugin only.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("plugin unavailable: {0}")]
    Unavailable(String),

    #[error("process exited with status {status}: {output}")]
    NonZeroExit { status: i32, output: String },

    #[error("malformed output: {0}")]
    MalformedOutput(String),

    #[error("scorer fault: {0}")]
    ScorerFault(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExecutionError {
    /// Short machine-friendly tag used in logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ExecutionError::Unavailable(_) => "unavailable",
            ExecutionError::NonZeroExit { .. } => "non-zero-exit",
            ExecutionError::MalformedOutput(_) => "malformed-output",
            ExecutionError::ScorerFault(_) => "scorer-fault",
            ExecutionError::Timeout(_) => "timeout",
            ExecutionError::Io(_) => "io",
        }
    }
}
