//! One benchmark run, end to end.
//!
//!   1. Extract and validate the evaluation dataset
//!   2. Resolve every expected label through the class map
//!   3. Discover plugins under the plugin root and apply the selection predicate
//!   4. Dispatch the selected plugins with bounded parallelism
//!   5. Merge their scores by uid and classify them against each cutoff
//!   6. Compute the requested summaries and metrics
//!
//! Steps 1-3 fail the run. From step 4 on, failures are recorded per plugin (or per
//! report cell) and the run always produces a report.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use vpmbench_common::{BenchConfig, BenchError, ClassMap, Result};
use vpmbench_ingestion::{extract_evaluation_data, Extractor};
use vpmbench_metrics::PerformanceStatistic;
use vpmbench_plugins::{predicates, select, InvocationStrategy, PluginPredicate, PluginRegistry};

use crate::engine::{EngineOptions, ExecutionEngine};
use crate::merge::merge;
use crate::report::{PerformanceReport, ReportBuilder};
use crate::state::EngineState;

/// Inputs of one run.
pub struct RunRequest {
    pub dataset: PathBuf,
    /// Overrides the extractor picked from the dataset's file extension
    pub extractor: Option<Arc<dyn Extractor>>,
    pub plugin_root: PathBuf,
    pub predicate: PluginPredicate,
    pub reporting: Vec<Arc<dyn PerformanceStatistic>>,
    pub class_map: ClassMap,
    pub options: EngineOptions,
}

impl RunRequest {
    /// Every plugin, the default statistics and the binary class map.
    pub fn new(dataset: impl Into<PathBuf>, plugin_root: impl Into<PathBuf>) -> Self {
        let defaults = BenchConfig::default();
        Self {
            dataset: dataset.into(),
            extractor: None,
            plugin_root: plugin_root.into(),
            predicate: predicates::all_plugins(),
            reporting: statistics(&defaults.report.metrics).unwrap_or_default(),
            class_map: defaults.classes,
            options: EngineOptions::default(),
        }
    }

    /// Statistics, class map and parallelism taken from `config`.
    pub fn from_config(
        dataset: impl Into<PathBuf>,
        plugin_root: impl Into<PathBuf>,
        config: &BenchConfig,
    ) -> Result<Self> {
        Ok(Self {
            reporting: statistics(&config.report.metrics)?,
            class_map: config.classes.clone(),
            options: EngineOptions::from_config(config),
            ..Self::new(dataset, plugin_root)
        })
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn with_predicate(mut self, predicate: PluginPredicate) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn with_reporting(mut self, reporting: Vec<Arc<dyn PerformanceStatistic>>) -> Self {
        self.reporting = reporting;
        self
    }

    pub fn with_class_map(mut self, class_map: ClassMap) -> Self {
        self.class_map = class_map;
        self
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }
}

/// Look up statistics by name. Unknown names are a configuration error.
pub fn statistics<S: AsRef<str>>(names: &[S]) -> Result<Vec<Arc<dyn PerformanceStatistic>>> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            vpmbench_metrics::by_name(name).ok_or_else(|| {
                BenchError::Config(format!(
                    "unknown summary or metric '{name}' (available: {})",
                    vpmbench_metrics::available().join(", ")
                ))
            })
        })
        .collect()
}

/// Run one benchmark and build its report.
#[instrument(skip_all, fields(dataset = %request.dataset.display(), plugins = %request.plugin_root.display()))]
pub async fn run_pipeline(request: RunRequest, invoker: Arc<dyn InvocationStrategy>) -> Result<PerformanceReport> {
    let started_at = Utc::now();
    let mut engine = ExecutionEngine::new(invoker, request.options);

    let data = extract_evaluation_data(&request.dataset, request.extractor.as_deref())?;
    let expected = request.class_map.resolve_all(&data)?;
    let data = Arc::new(data);
    engine.advance(EngineState::Extracted);

    let discovered = PluginRegistry::discover_at(&request.plugin_root)?;
    let selected = select(&discovered, &*request.predicate);
    info!(discovered = discovered.len(), selected = selected.len(), "Plugins selected");
    engine.advance(EngineState::PluginsLoaded);

    let outcomes = engine.dispatch(selected, Arc::clone(&data)).await;

    let merged = merge(data, outcomes);
    engine.advance(EngineState::Merged);

    let report = ReportBuilder::new(request.reporting, request.class_map).build(merged, &expected, started_at);
    engine.advance(EngineState::Reported);

    info!(
        evaluated = report.evaluated.len(),
        excluded = report.excluded.len(),
        "Benchmark finished"
    );
    engine.advance(EngineState::Done);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_by_name() {
        let stats = statistics(&["sensitivity", "AUROC"]).unwrap();
        let names: Vec<&str> = stats.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Sensitivity", "Area under the Curve ROC"]);

        let err = statistics(&["F1"]).err().unwrap();
        assert!(matches!(err, BenchError::Config(_)));
        assert!(err.to_string().contains("F1"));
    }

    #[test]
    fn test_request_defaults() {
        let request = RunRequest::new("data.csv", "plugins");
        assert_eq!(request.reporting.len(), 3);
        assert_eq!(request.class_map, ClassMap::binary());
        assert!(request.extractor.is_none());
    }
}
