//! In-process scorers for native plugins.
//!
//! A native manifest names an entry file. When a scorer has been registered under that
//! name, the native strategy calls it directly instead of running the file.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use vpmbench_common::{ScoreTable, VariantRow};

use crate::plugin::NativeEntryPoint;

/// Scoring function: variant rows in, `UID → SCORE` table out.
///
/// Implementations may fail or even panic; the native strategy turns both into an
/// execution error for that plugin only.
pub trait Scorer: Send + Sync {
    fn score(&self, rows: &[VariantRow]) -> anyhow::Result<ScoreTable>;
}

impl<F> Scorer for F
where
    F: Fn(&[VariantRow]) -> anyhow::Result<ScoreTable> + Send + Sync,
{
    fn score(&self, rows: &[VariantRow]) -> anyhow::Result<ScoreTable> {
        self(rows)
    }
}

/// Scorers keyed by the entry file a manifest declares.
#[derive(Clone, Default)]
pub struct ScorerCatalog {
    scorers: HashMap<String, Arc<dyn Scorer>>,
}

impl std::fmt::Debug for ScorerCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.scorers.keys().collect();
        keys.sort();
        f.debug_struct("ScorerCatalog").field("scorers", &keys).finish()
    }
}

impl ScorerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `scorer` for manifests whose `file` is `entry` (either the declared
    /// relative path or just its file name).
    pub fn register(&mut self, entry: impl Into<String>, scorer: Arc<dyn Scorer>) -> &mut Self {
        self.scorers.insert(entry.into(), scorer);
        self
    }

    pub fn with(mut self, entry: impl Into<String>, scorer: Arc<dyn Scorer>) -> Self {
        self.register(entry, scorer);
        self
    }

    pub fn len(&self) -> usize {
        self.scorers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scorers.is_empty()
    }

    /// Scorer for a native entry point, matched on the declared path first and then on the
    /// bare file name.
    pub fn lookup(&self, entry: &NativeEntryPoint) -> Option<Arc<dyn Scorer>> {
        if let Some(scorer) = self.scorers.get(&entry.declared) {
            return Some(scorer.clone());
        }
        Path::new(&entry.declared)
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| self.scorers.get(n))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn entry(declared: &str) -> NativeEntryPoint {
        NativeEntryPoint {
            declared: declared.to_string(),
            file: PathBuf::from("/plugins/x").join(declared),
        }
    }

    fn constant(score: f64) -> Arc<dyn Scorer> {
        Arc::new(move |rows: &[VariantRow]| -> anyhow::Result<ScoreTable> {
            Ok(rows.iter().map(|r| (r.uid, score)).collect())
        })
    }

    #[test]
    fn test_lookup_by_declared_path_then_file_name() {
        let catalog = ScorerCatalog::new()
            .with("scripts/entry.py", constant(0.1))
            .with("other.py", constant(0.9));
        assert_eq!(catalog.len(), 2);
        assert!(catalog.lookup(&entry("scripts/entry.py")).is_some());
        assert!(catalog.lookup(&entry("nested/other.py")).is_some());
        assert!(catalog.lookup(&entry("missing.py")).is_none());
    }

    #[test]
    fn test_closure_scorer() {
        let scorer = constant(0.6);
        let table = scorer.score(&[]).unwrap();
        assert!(table.is_empty());
    }
}
