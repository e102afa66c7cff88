//! Summaries: confusion matrix, ROC curve, precision/recall curve.

use crate::error::MetricError;
use crate::labels::LabeledPredictions;
use crate::{PerformanceStatistic, StatisticKind, StatisticValue, SummaryValue};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfusionMatrix;

impl PerformanceStatistic for ConfusionMatrix {
    fn name(&self) -> &'static str {
        "Confusion Matrix"
    }

    fn kind(&self) -> StatisticKind {
        StatisticKind::Summary
    }

    fn calculate(&self, input: &LabeledPredictions) -> Result<StatisticValue, MetricError> {
        let n = input.class_count;
        let mut matrix = vec![vec![0u64; n]; n];
        for (&e, &p) in input.expected.iter().zip(&input.predicted) {
            matrix[e][p] += 1;
        }
        Ok(StatisticValue::Summary(SummaryValue::ConfusionMatrix {
            labels: (0..n).collect(),
            matrix,
            counts: input.counts(),
        }))
    }
}

/// Distinct scores, highest first, with the cumulative true/false positive counts of
/// predicting positive at `score >= threshold`.
fn threshold_sweep(input: &LabeledPredictions) -> Vec<(f64, u64, u64)> {
    let mut pairs: Vec<(f64, bool)> = input.scores.iter().copied().zip(input.positives()).collect();
    pairs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut sweep = Vec::new();
    let (mut tp, mut fp) = (0u64, 0u64);
    for (i, &(score, positive)) in pairs.iter().enumerate() {
        if positive {
            tp += 1;
        } else {
            fp += 1;
        }
        let last_of_tie = pairs.get(i + 1).map_or(true, |next| next.0 != score);
        if last_of_tie {
            sweep.push((score, tp, fp));
        }
    }
    sweep
}

fn binary_only(input: &LabeledPredictions, name: &'static str) -> Result<(u64, u64), MetricError> {
    if input.is_multiclass() {
        return Err(MetricError::MultiClass(name));
    }
    if input.is_empty() {
        return Err(MetricError::Empty);
    }
    let positives = input.positives().filter(|p| *p).count() as u64;
    Ok((positives, input.len() as u64 - positives))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RocCurve;

impl PerformanceStatistic for RocCurve {
    fn name(&self) -> &'static str {
        "ROC Curve"
    }

    fn kind(&self) -> StatisticKind {
        StatisticKind::Summary
    }

    fn calculate(&self, input: &LabeledPredictions) -> Result<StatisticValue, MetricError> {
        let (positives, negatives) = binary_only(input, self.name())?;
        if positives == 0 || negatives == 0 {
            return Err(MetricError::Undefined {
                metric: self.name(),
                reason: "needs both positive and negative examples",
            });
        }
        let sweep = threshold_sweep(input);
        let mut x = vec![0.0];
        let mut y = vec![0.0];
        let mut thresholds = Vec::with_capacity(sweep.len());
        for (threshold, tp, fp) in sweep {
            x.push(fp as f64 / negatives as f64);
            y.push(tp as f64 / positives as f64);
            thresholds.push(threshold);
        }
        Ok(StatisticValue::Summary(SummaryValue::Curve {
            x_label: "fpr",
            y_label: "tpr",
            x,
            y,
            thresholds,
        }))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PrecisionRecallCurve;

impl PerformanceStatistic for PrecisionRecallCurve {
    fn name(&self) -> &'static str {
        "Precision-Recall Curve"
    }

    fn kind(&self) -> StatisticKind {
        StatisticKind::Summary
    }

    fn calculate(&self, input: &LabeledPredictions) -> Result<StatisticValue, MetricError> {
        let (positives, _) = binary_only(input, self.name())?;
        if positives == 0 {
            return Err(MetricError::Undefined {
                metric: self.name(),
                reason: "needs at least one positive example",
            });
        }
        let sweep = threshold_sweep(input);
        let mut x = vec![0.0];
        let mut y = vec![1.0];
        let mut thresholds = Vec::with_capacity(sweep.len());
        for (threshold, tp, fp) in sweep {
            x.push(tp as f64 / positives as f64);
            y.push(tp as f64 / (tp + fp) as f64);
            thresholds.push(threshold);
        }
        Ok(StatisticValue::Summary(SummaryValue::Curve {
            x_label: "recall",
            y_label: "precision",
            x,
            y,
            thresholds,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(value: StatisticValue) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        match value {
            StatisticValue::Summary(SummaryValue::Curve { x, y, thresholds, .. }) => (x, y, thresholds),
            other => panic!("expected a curve, got {other:?}"),
        }
    }

    fn sample() -> LabeledPredictions {
        LabeledPredictions::binary(vec![0, 0, 1, 1], vec![0, 0, 0, 1], vec![0.1, 0.4, 0.35, 0.8]).unwrap()
    }

    #[test]
    fn test_confusion_matrix_multiclass() {
        let input = LabeledPredictions::new(vec![0, 1, 2, 2], vec![0, 2, 2, 1], vec![0.0; 4], 2, 3).unwrap();
        match ConfusionMatrix.calculate(&input).unwrap() {
            StatisticValue::Summary(SummaryValue::ConfusionMatrix { labels, matrix, counts }) => {
                assert_eq!(labels, vec![0, 1, 2]);
                assert_eq!(matrix, vec![vec![1, 0, 0], vec![0, 0, 1], vec![0, 1, 1]]);
                assert_eq!(counts.tp, 1);
                assert_eq!(counts.fp, 1);
                assert_eq!(counts.fn_, 1);
                assert_eq!(counts.tn, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_roc_curve() {
        let (x, y, thresholds) = curve(RocCurve.calculate(&sample()).unwrap());
        assert_eq!(x, vec![0.0, 0.0, 0.5, 0.5, 1.0]);
        assert_eq!(y, vec![0.0, 0.5, 0.5, 1.0, 1.0]);
        assert_eq!(thresholds, vec![0.8, 0.4, 0.35, 0.1]);
    }

    #[test]
    fn test_precision_recall_curve() {
        let (recall, precision, _) = curve(PrecisionRecallCurve.calculate(&sample()).unwrap());
        assert_eq!(recall, vec![0.0, 0.5, 0.5, 1.0, 1.0]);
        assert_eq!(precision, vec![1.0, 1.0, 0.5, 2.0 / 3.0, 0.5]);
    }

    #[test]
    fn test_curves_reject_multiclass() {
        let input = LabeledPredictions::new(vec![0, 1, 2], vec![0, 1, 2], vec![0.1, 0.5, 0.9], 2, 3).unwrap();
        assert_eq!(RocCurve.calculate(&input), Err(MetricError::MultiClass("ROC Curve")));
        assert!(PrecisionRecallCurve.calculate(&input).is_err());
    }

    #[test]
    fn test_tied_scores_share_a_point() {
        let input = LabeledPredictions::binary(vec![0, 1, 1], vec![1, 1, 1], vec![0.5, 0.5, 0.9]).unwrap();
        let (x, y, thresholds) = curve(RocCurve.calculate(&input).unwrap());
        assert_eq!(thresholds, vec![0.9, 0.5]);
        assert_eq!(x, vec![0.0, 0.0, 1.0]);
        assert_eq!(y, vec![0.0, 0.5, 1.0]);
    }
}
