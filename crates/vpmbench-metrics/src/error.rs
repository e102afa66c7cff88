use thiserror::Error;

/// Why a statistic could not be computed for one plugin.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricError {
    #[error("expected and predicted labels differ in length ({expected} vs {predicted})")]
    LengthMismatch { expected: usize, predicted: usize },

    #[error("scores and labels differ in length ({scores} vs {labels})")]
    ScoreLengthMismatch { scores: usize, labels: usize },

    #[error("class {class} is outside the {class_count} known classes")]
    ClassOutOfRange { class: usize, class_count: usize },

    #[error("no labeled predictions")]
    Empty,

    #[error("'{0}' is only defined for binary classification")]
    MultiClass(&'static str),

    #[error("'{metric}' is undefined: {reason}")]
    Undefined { metric: &'static str, reason: &'static str },
}
