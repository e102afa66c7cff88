//! Lookup of statistics by their report name.

use std::sync::Arc;

use crate::metrics::{Accuracy, AreaUnderRoc, Precision, Sensitivity, Specificity};
use crate::summaries::{ConfusionMatrix, PrecisionRecallCurve, RocCurve};
use crate::PerformanceStatistic;

fn all() -> Vec<Arc<dyn PerformanceStatistic>> {
    vec![
        Arc::new(ConfusionMatrix),
        Arc::new(RocCurve),
        Arc::new(PrecisionRecallCurve),
        Arc::new(Sensitivity),
        Arc::new(Specificity),
        Arc::new(Precision),
        Arc::new(Accuracy),
        Arc::new(AreaUnderRoc),
    ]
}

fn normalise(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Names of every built-in statistic.
pub fn available() -> Vec<&'static str> {
    all().iter().map(|s| s.name()).collect()
}

/// Find a statistic by name, ignoring case, spaces and punctuation. `AUROC`/`AUC` and
/// `PR Curve` are accepted as short forms.
pub fn by_name(name: &str) -> Option<Arc<dyn PerformanceStatistic>> {
    let wanted = match normalise(name).as_str() {
        "auroc" | "auc" | "rocauc" => normalise("Area under the Curve ROC"),
        "prcurve" => normalise("Precision-Recall Curve"),
        other => other.to_string(),
    };
    all().into_iter().find(|s| normalise(s.name()) == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(by_name("confusion matrix").map(|s| s.name()), Some("Confusion Matrix"));
        assert_eq!(by_name("AUROC").map(|s| s.name()), Some("Area under the Curve ROC"));
        assert_eq!(by_name("precision_recall_curve").map(|s| s.name()), Some("Precision-Recall Curve"));
        assert!(by_name("F1").is_none());
        assert_eq!(available().len(), 8);
    }
}
