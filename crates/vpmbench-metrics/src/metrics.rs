//! Single-number metrics.

use crate::error::MetricError;
use crate::labels::LabeledPredictions;
use crate::{PerformanceStatistic, StatisticKind, StatisticValue};

fn ratio(metric: &'static str, numerator: u64, denominator: u64, reason: &'static str) -> Result<StatisticValue, MetricError> {
    if denominator == 0 {
        return Err(MetricError::Undefined { metric, reason });
    }
    Ok(StatisticValue::Metric(numerator as f64 / denominator as f64))
}

/// True positive rate of the positive class.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sensitivity;

impl PerformanceStatistic for Sensitivity {
    fn name(&self) -> &'static str {
        "Sensitivity"
    }

    fn kind(&self) -> StatisticKind {
        StatisticKind::Metric
    }

    fn calculate(&self, input: &LabeledPredictions) -> Result<StatisticValue, MetricError> {
        let c = input.counts();
        ratio(self.name(), c.tp, c.tp + c.fn_, "no positive examples")
    }
}

/// True negative rate with respect to the positive class.
#[derive(Debug, Clone, Copy, Default)]
pub struct Specificity;

impl PerformanceStatistic for Specificity {
    fn name(&self) -> &'static str {
        "Specificity"
    }

    fn kind(&self) -> StatisticKind {
        StatisticKind::Metric
    }

    fn calculate(&self, input: &LabeledPredictions) -> Result<StatisticValue, MetricError> {
        let c = input.counts();
        ratio(self.name(), c.tn, c.tn + c.fp, "no negative examples")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Precision;

impl PerformanceStatistic for Precision {
    fn name(&self) -> &'static str {
        "Precision"
    }

    fn kind(&self) -> StatisticKind {
        StatisticKind::Metric
    }

    fn calculate(&self, input: &LabeledPredictions) -> Result<StatisticValue, MetricError> {
        let c = input.counts();
        ratio(self.name(), c.tp, c.tp + c.fp, "nothing was predicted positive")
    }
}

/// Fraction of rows whose predicted class equals the expected class. Multi-class safe.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accuracy;

impl PerformanceStatistic for Accuracy {
    fn name(&self) -> &'static str {
        "Accuracy"
    }

    fn kind(&self) -> StatisticKind {
        StatisticKind::Metric
    }

    fn calculate(&self, input: &LabeledPredictions) -> Result<StatisticValue, MetricError> {
        let correct = input.expected.iter().zip(&input.predicted).filter(|(e, p)| e == p).count();
        ratio(self.name(), correct as u64, input.len() as u64, "no labeled predictions")
    }
}

/// Area under the ROC curve, via the rank-sum (Mann-Whitney U) statistic.
#[derive(Debug, Clone, Copy, Default)]
pub struct AreaUnderRoc;

/// Ascending 1-based ranks, ties averaged.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut ranks = vec![0.0f64; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && indexed[j + 1].1 == indexed[i].1 {
            j += 1;
        }
        let avg_rank = (i + 1 + j + 1) as f64 / 2.0;
        for item in &indexed[i..=j] {
            ranks[item.0] = avg_rank;
        }
        i = j + 1;
    }
    ranks
}

impl PerformanceStatistic for AreaUnderRoc {
    fn name(&self) -> &'static str {
        "Area under the Curve ROC"
    }

    fn kind(&self) -> StatisticKind {
        StatisticKind::Metric
    }

    fn calculate(&self, input: &LabeledPredictions) -> Result<StatisticValue, MetricError> {
        if input.is_multiclass() {
            return Err(MetricError::MultiClass(self.name()));
        }
        let ranks = average_ranks(&input.scores);
        let (mut positives, mut rank_sum) = (0u64, 0.0f64);
        for (rank, positive) in ranks.iter().zip(input.positives()) {
            if positive {
                positives += 1;
                rank_sum += rank;
            }
        }
        let negatives = input.len() as u64 - positives;
        if positives == 0 || negatives == 0 {
            return Err(MetricError::Undefined {
                metric: self.name(),
                reason: "needs both positive and negative examples",
            });
        }
        let p = positives as f64;
        let u = rank_sum - p * (p + 1.0) / 2.0;
        Ok(StatisticValue::Metric(u / (p * negatives as f64)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(stat: &dyn PerformanceStatistic, input: &LabeledPredictions) -> f64 {
        stat.calculate(input).unwrap().as_metric().unwrap()
    }

    #[test]
    fn test_ratio_metrics() {
        let input = LabeledPredictions::binary(vec![1, 1, 1, 0, 0], vec![1, 1, 0, 1, 0], vec![0.0; 5]).unwrap();
        assert!((metric(&Sensitivity, &input) - 2.0 / 3.0).abs() < 1e-12);
        assert!((metric(&Specificity, &input) - 0.5).abs() < 1e-12);
        assert!((metric(&Precision, &input) - 2.0 / 3.0).abs() < 1e-12);
        assert!((metric(&Accuracy, &input) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_empty_denominator_is_an_error() {
        let all_positive = LabeledPredictions::binary(vec![1, 1], vec![1, 1], vec![0.9, 0.9]).unwrap();
        assert_eq!(metric(&Sensitivity, &all_positive), 1.0);
        assert!(matches!(
            Specificity.calculate(&all_positive),
            Err(MetricError::Undefined { metric: "Specificity", .. })
        ));
        let empty = LabeledPredictions::binary(vec![], vec![], vec![]).unwrap();
        assert!(Accuracy.calculate(&empty).is_err());
    }

    #[test]
    fn test_auroc() {
        let input = LabeledPredictions::binary(vec![0, 0, 1, 1], vec![0; 4], vec![0.1, 0.4, 0.35, 0.8]).unwrap();
        assert!((metric(&AreaUnderRoc, &input) - 0.75).abs() < 1e-12);

        let ties = LabeledPredictions::binary(vec![0, 1], vec![0, 0], vec![0.5, 0.5]).unwrap();
        assert!((metric(&AreaUnderRoc, &ties) - 0.5).abs() < 1e-12);

        let multi = LabeledPredictions::new(vec![0, 1, 2], vec![0, 1, 2], vec![0.1, 0.5, 0.9], 2, 3).unwrap();
        assert_eq!(AreaUnderRoc.calculate(&multi), Err(MetricError::MultiClass("Area under the Curve ROC")));
    }

    #[test]
    fn test_average_ranks() {
        assert_eq!(average_ranks(&[3.0, 1.0, 2.0, 2.0]), vec![4.0, 1.0, 2.5, 2.5]);
        assert!(average_ranks(&[]).is_empty());
    }
}
