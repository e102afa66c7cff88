//! Report Builder: per-(statistic, plugin) results over a merged dataset.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use vpmbench_common::{BenchError, ClassMap, Result};
use vpmbench_metrics::{LabeledPredictions, PerformanceStatistic, StatisticKind, StatisticValue};

use crate::merge::{ExcludedPlugin, MergedDataset, PluginColumn};

/// One cell of the report: a computed statistic, or the reason it could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportCell {
    Value(StatisticValue),
    Gap { error: String },
}

impl ReportCell {
    pub fn value(&self) -> Option<&StatisticValue> {
        match self {
            ReportCell::Value(v) => Some(v),
            ReportCell::Gap { .. } => None,
        }
    }

    pub fn is_gap(&self) -> bool {
        matches!(self, ReportCell::Gap { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatisticInfo {
    pub name: String,
    pub kind: StatisticKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Statistics in the order they were requested
    pub statistics: Vec<StatisticInfo>,
    /// Plugins that produced a usable score column
    pub evaluated: Vec<String>,
    pub excluded: Vec<ExcludedPlugin>,
    /// `results[statistic][plugin]`
    pub results: BTreeMap<String, BTreeMap<String, ReportCell>>,
    pub merged: MergedDataset,
}

impl PerformanceReport {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(BenchError::Serialization)
    }

    pub fn metric(&self, statistic: &str, plugin: &str) -> Option<&ReportCell> {
        self.results.get(statistic)?.get(plugin)
    }

    /// The numeric value of a metric cell, if it was computed.
    pub fn metric_value(&self, statistic: &str, plugin: &str) -> Option<f64> {
        self.metric(statistic, plugin)?.value()?.as_metric()
    }

    /// Plain-text listing of every metric (summaries are left to the JSON form).
    pub fn render_metrics(&self) -> String {
        let mut out = String::new();
        let width = self.evaluated.iter().map(String::len).max().unwrap_or(0).max(6);
        for stat in self.statistics.iter().filter(|s| s.kind == StatisticKind::Metric) {
            let _ = writeln!(out, "{}", stat.name);
            for plugin in &self.evaluated {
                let cell = match self.metric(&stat.name, plugin) {
                    Some(ReportCell::Value(v)) => match v.as_metric() {
                        Some(x) => format!("{x:.4}"),
                        None => "-".to_string(),
                    },
                    Some(ReportCell::Gap { error }) => format!("n/a ({error})"),
                    None => "-".to_string(),
                };
                let _ = writeln!(out, "  {plugin:<width$}  {cell}");
            }
        }
        if !self.excluded.is_empty() {
            let _ = writeln!(out, "Excluded");
            for e in &self.excluded {
                let _ = writeln!(out, "  {:<width$}  {}: {}", e.name, e.kind, e.reason);
            }
        }
        out
    }
}

/// Computes the configured statistics for every evaluated plugin.
pub struct ReportBuilder {
    statistics: Vec<Arc<dyn PerformanceStatistic>>,
    class_map: ClassMap,
}

impl ReportBuilder {
    pub fn new(statistics: Vec<Arc<dyn PerformanceStatistic>>, class_map: ClassMap) -> Self {
        Self { statistics, class_map }
    }

    /// `expected` holds the resolved expected class of every row, indexed by uid.
    pub fn build(&self, merged: MergedDataset, expected: &[usize], started_at: DateTime<Utc>) -> PerformanceReport {
        let mut results: BTreeMap<String, BTreeMap<String, ReportCell>> = BTreeMap::new();
        for column in merged.columns() {
            let input = self.labelled(column, expected);
            for stat in &self.statistics {
                let cell = match &input {
                    Ok(input) => match stat.calculate(input) {
                        Ok(value) => ReportCell::Value(value),
                        Err(e) => ReportCell::Gap { error: e.to_string() },
                    },
                    Err(e) => ReportCell::Gap { error: e.to_string() },
                };
                if let ReportCell::Gap { error } = &cell {
                    warn!(statistic = stat.name(), plugin = %column.plugin.name, %error, "Statistic left as a gap");
                }
                results
                    .entry(stat.name().to_string())
                    .or_default()
                    .insert(column.plugin.name.clone(), cell);
            }
        }

        let evaluated: Vec<String> = merged.plugins().map(str::to_string).collect();
        info!(
            evaluated = evaluated.len(),
            excluded = merged.excluded().len(),
            statistics = self.statistics.len(),
            "Report built"
        );
        PerformanceReport {
            started_at,
            finished_at: Utc::now(),
            statistics: self
                .statistics
                .iter()
                .map(|s| StatisticInfo { name: s.name().to_string(), kind: s.kind() })
                .collect(),
            evaluated,
            excluded: merged.excluded().to_vec(),
            results,
            merged,
        }
    }

    fn labelled(
        &self,
        column: &PluginColumn,
        expected: &[usize],
    ) -> std::result::Result<LabeledPredictions, vpmbench_metrics::MetricError> {
        let class_count = self.class_map.class_count().max(column.plugin.cutoff.class_count());
        LabeledPredictions::new(
            expected.to_vec(),
            column.classes.clone(),
            column.scores.clone(),
            self.class_map.positive_class(),
            class_count,
        )
    }
}
