use serde::Serialize;

use crate::error::MetricError;

/// Expected vs. predicted classes (and raw scores) for one plugin, aligned by uid.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledPredictions {
    pub expected: Vec<usize>,
    pub predicted: Vec<usize>,
    pub scores: Vec<f64>,
    pub positive_class: usize,
    pub class_count: usize,
}

impl LabeledPredictions {
    /// Check lengths and class ranges.
    pub fn new(
        expected: Vec<usize>,
        predicted: Vec<usize>,
        scores: Vec<f64>,
        positive_class: usize,
        class_count: usize,
    ) -> Result<Self, MetricError> {
        if expected.len() != predicted.len() {
            return Err(MetricError::LengthMismatch {
                expected: expected.len(),
                predicted: predicted.len(),
            });
        }
        if scores.len() != expected.len() {
            return Err(MetricError::ScoreLengthMismatch {
                scores: scores.len(),
                labels: expected.len(),
            });
        }
        let class_count = class_count.max(positive_class + 1);
        if let Some(&class) = expected.iter().chain(&predicted).find(|&&c| c >= class_count) {
            return Err(MetricError::ClassOutOfRange { class, class_count });
        }
        Ok(Self { expected, predicted, scores, positive_class, class_count })
    }

    /// Binary labels (`0 = benign`, `1 = pathogenic`) with their scores.
    pub fn binary(expected: Vec<usize>, predicted: Vec<usize>, scores: Vec<f64>) -> Result<Self, MetricError> {
        Self::new(expected, predicted, scores, 1, 2)
    }

    pub fn len(&self) -> usize {
        self.expected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }

    pub fn is_multiclass(&self) -> bool {
        self.class_count > 2
    }

    /// One-vs-rest counts for the positive class.
    pub fn counts(&self) -> BinaryCounts {
        let mut counts = BinaryCounts::default();
        for (&e, &p) in self.expected.iter().zip(&self.predicted) {
            match (e == self.positive_class, p == self.positive_class) {
                (true, true) => counts.tp += 1,
                (true, false) => counts.fn_ += 1,
                (false, true) => counts.fp += 1,
                (false, false) => counts.tn += 1,
            }
        }
        counts
    }

    /// `true` for rows whose expected class is the positive class.
    pub(crate) fn positives(&self) -> impl Iterator<Item = bool> + '_ {
        self.expected.iter().map(move |&e| e == self.positive_class)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BinaryCounts {
    pub tn: u64,
    pub fp: u64,
    #[serde(rename = "fn")]
    pub fn_: u64,
    pub tp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let input = LabeledPredictions::binary(vec![1, 1, 0, 0, 1], vec![1, 0, 1, 0, 1], vec![0.0; 5]).unwrap();
        assert_eq!(input.counts(), BinaryCounts { tn: 1, fp: 1, fn_: 1, tp: 2 });
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            LabeledPredictions::binary(vec![1], vec![1, 0], vec![0.0]),
            Err(MetricError::LengthMismatch { .. })
        ));
        assert!(matches!(
            LabeledPredictions::binary(vec![1, 0], vec![1, 0], vec![0.0]),
            Err(MetricError::ScoreLengthMismatch { .. })
        ));
        assert!(matches!(
            LabeledPredictions::binary(vec![3], vec![1], vec![0.0]),
            Err(MetricError::ClassOutOfRange { class: 3, .. })
        ));
        let multi = LabeledPredictions::new(vec![0, 2], vec![1, 2], vec![0.1, 0.9], 2, 3).unwrap();
        assert!(multi.is_multiclass());
    }
}
