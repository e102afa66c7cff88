//! Merging plugin scores back into the dataset.
//!
//! Scores are joined by uid into a map keyed by plugin name, so the merged result does
//! not depend on the order in which plugins finished.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use tracing::{debug, warn};
use vpmbench_common::{EvaluationData, Uid, VariantRow};
use vpmbench_plugins::Plugin;

use crate::engine::PluginOutcome;

/// Score and predicted-class columns for one successfully evaluated plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginColumn {
    pub plugin: Plugin,
    /// Indexed by uid
    pub scores: Vec<f64>,
    /// Indexed by uid
    pub classes: Vec<usize>,
}

/// A plugin left out of the report, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedPlugin {
    pub name: String,
    pub kind: String,
    pub reason: String,
}

/// One dataset row with every plugin's `<plugin>_SCORE` / `<plugin>_CLASS` values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    #[serde(flatten)]
    pub variant: VariantRow,
    #[serde(rename = "CLASS")]
    pub expected_class: String,
    #[serde(flatten)]
    pub scores: BTreeMap<String, f64>,
    #[serde(flatten)]
    pub classes: BTreeMap<String, usize>,
}

/// The evaluation dataset plus one score/class column pair per evaluated plugin.
#[derive(Debug, Clone)]
pub struct MergedDataset {
    data: Arc<EvaluationData>,
    columns: BTreeMap<String, PluginColumn>,
    excluded: Vec<ExcludedPlugin>,
}

impl MergedDataset {
    pub fn data(&self) -> &EvaluationData {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Names of the evaluated plugins, sorted.
    pub fn plugins(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = &PluginColumn> {
        self.columns.values()
    }

    pub fn column(&self, plugin: &str) -> Option<&PluginColumn> {
        self.columns.get(plugin)
    }

    pub fn excluded(&self) -> &[ExcludedPlugin] {
        &self.excluded
    }

    pub fn score(&self, uid: Uid, plugin: &str) -> Option<f64> {
        self.columns.get(plugin)?.scores.get(uid).copied()
    }

    pub fn predicted_class(&self, uid: Uid, plugin: &str) -> Option<usize> {
        self.columns.get(plugin)?.classes.get(uid).copied()
    }

    /// Row-wise view of the merged table.
    pub fn records(&self) -> Vec<MergedRecord> {
        self.data
            .rows()
            .iter()
            .zip(self.data.expected_classes())
            .map(|(row, class)| MergedRecord {
                variant: row.clone(),
                expected_class: class.clone(),
                scores: self
                    .columns
                    .values()
                    .map(|c| (c.plugin.score_column(), c.scores[row.uid]))
                    .collect(),
                classes: self
                    .columns
                    .values()
                    .map(|c| (c.plugin.class_column(), c.classes[row.uid]))
                    .collect(),
            })
            .collect()
    }
}

impl Serialize for MergedDataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records().serialize(serializer)
    }
}

/// Join every successful outcome into `data` and classify its scores.
///
/// An outcome whose table does not cover the dataset exactly (missing, duplicate or
/// foreign uids, non-finite scores) is excluded as malformed output.
pub fn merge(data: Arc<EvaluationData>, outcomes: Vec<PluginOutcome>) -> MergedDataset {
    let mut columns = BTreeMap::new();
    let mut excluded = Vec::new();

    for PluginOutcome { plugin, result } in outcomes {
        let aligned = match result {
            Ok(table) => table.align(data.len()).map_err(|reason| ("malformed-output", reason)),
            Err(e) => Err((e.kind(), e.to_string())),
        };
        match aligned {
            Ok(scores) => {
                let classes: Vec<usize> = scores.iter().map(|&s| plugin.cutoff.classify(s)).collect();
                debug!(plugin = %plugin.name, rows = scores.len(), "Merged plugin scores");
                columns.insert(plugin.name.clone(), PluginColumn { plugin, scores, classes });
            }
            Err((kind, reason)) => {
                warn!(plugin = %plugin.name, kind, %reason, "Excluding plugin from report");
                excluded.push(ExcludedPlugin { name: plugin.name, kind: kind.to_string(), reason });
            }
        }
    }
    excluded.sort_by(|a, b| a.name.cmp(&b.name));

    MergedDataset { data, columns, excluded }
}
