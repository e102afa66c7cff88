//! vpmbench-metrics: Performance summaries and metrics.
//!
//! Everything here is a pure function of a [`LabeledPredictions`] set. Summaries
//! (confusion matrix, ROC and precision/recall curves) produce a structured
//! [`SummaryValue`]; metrics (sensitivity, specificity, ...) produce one number.

pub mod error;
pub mod labels;
pub mod summaries;
pub mod metrics;
pub mod catalog;

pub use catalog::{available, by_name};
pub use error::MetricError;
pub use labels::{BinaryCounts, LabeledPredictions};
pub use summaries::{ConfusionMatrix, PrecisionRecallCurve, RocCurve};
pub use metrics::{Accuracy, AreaUnderRoc, Precision, Sensitivity, Specificity};

use serde::Serialize;

/// Whether a statistic is a descriptive artifact or a single number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatisticKind {
    Summary,
    Metric,
}

/// Structured summary output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SummaryValue {
    ConfusionMatrix {
        /// Class indices, in row/column order
        labels: Vec<usize>,
        /// `matrix[expected][predicted]`
        matrix: Vec<Vec<u64>>,
        /// One-vs-rest counts for the positive class
        counts: BinaryCounts,
    },
    Curve {
        x_label: &'static str,
        y_label: &'static str,
        x: Vec<f64>,
        y: Vec<f64>,
        /// Score threshold for every point after the first
        thresholds: Vec<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatisticValue {
    Metric(f64),
    Summary(SummaryValue),
}

impl StatisticValue {
    pub fn as_metric(&self) -> Option<f64> {
        match self {
            StatisticValue::Metric(v) => Some(*v),
            StatisticValue::Summary(_) => None,
        }
    }
}

/// One summary or metric.
pub trait PerformanceStatistic: Send + Sync {
    fn name(&self) -> &'static str;

    fn kind(&self) -> StatisticKind;

    fn calculate(&self, input: &LabeledPredictions) -> Result<StatisticValue, MetricError>;
}
