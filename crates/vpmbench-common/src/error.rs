use std::path::PathBuf;

use thiserror::Error;

/// Run-level error taxonomy.
///
/// Only `Extraction`, `RegistryConflict`, `Config` and the I/O variants are fatal to a run.
/// Manifest, execution and report problems are contained per plugin (or per metric cell)
/// and surface as data in the report instead of as an `Err`.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Manifest error in {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    #[error("Registry conflict: plugin name '{name}' is declared by both {first} and {second}")]
    RegistryConflict {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Execution error in plugin '{plugin}': {message}")]
    Execution { plugin: String, message: String },

    #[error("Report error for '{statistic}' on plugin '{plugin}': {message}")]
    Report {
        statistic: String,
        plugin: String,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BenchError {
    /// True for errors that abort a run before any plugin work begins.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            BenchError::Manifest { .. } | BenchError::Execution { .. } | BenchError::Report { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contained_errors_are_not_fatal() {
        let manifest = BenchError::Manifest {
            path: PathBuf::from("plugins/a/manifest.yaml"),
            message: "missing field `name`".to_string(),
        };
        let execution = BenchError::Execution {
            plugin: "a".to_string(),
            message: "exit status 1".to_string(),
        };
        assert!(!manifest.is_fatal());
        assert!(!execution.is_fatal());
        assert!(BenchError::Extraction("bad POS".to_string()).is_fatal());
    }

    #[test]
    fn test_conflict_message_names_both_manifests() {
        let err = BenchError::RegistryConflict {
            name: "sift".to_string(),
            first: PathBuf::from("a/manifest.yaml"),
            second: PathBuf::from("b/manifest.yaml"),
        };
        let msg = err.to_string();
        assert!(msg.contains("sift"));
        assert!(msg.contains("a/manifest.yaml"));
        assert!(msg.contains("b/manifest.yaml"));
    }
}
