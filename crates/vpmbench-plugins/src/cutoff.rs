//! Score → class resolution.
//!
//! A cutoff is either a single threshold (binary) or an ascending list of class
//! boundaries (ordered multi-class). Malformed cutoffs are rejected when the plugin is
//! built, so [`Cutoff::classify`] itself cannot fail.

use serde::Serialize;
use thiserror::Error;

/// Threshold used when a manifest does not declare one.
pub const DEFAULT_CUTOFF: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CutoffError {
    #[error("cutoff list is empty")]
    Empty,

    #[error("cutoff value {0} is not a finite number")]
    NotFinite(f64),

    #[error("cutoff boundaries must be strictly ascending ({previous} is followed by {next})")]
    NotAscending { previous: f64, next: f64 },
}

/// Upper bound of one class band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Boundary {
    pub value: f64,
    /// `true`: band holds `score <= value`; `false`: `score < value`
    pub inclusive: bool,
}

impl Boundary {
    pub fn below(value: f64) -> Self {
        Self { value, inclusive: false }
    }

    pub fn at_most(value: f64) -> Self {
        Self { value, inclusive: true }
    }

    fn admits(&self, score: f64) -> bool {
        if self.inclusive {
            score <= self.value
        } else {
            score < self.value
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cutoff {
    Threshold(f64),
    Bands(Vec<Boundary>),
}

impl Default for Cutoff {
    fn default() -> Self {
        Cutoff::Threshold(DEFAULT_CUTOFF)
    }
}

impl Cutoff {
    pub fn threshold(value: f64) -> Result<Self, CutoffError> {
        if !value.is_finite() {
            return Err(CutoffError::NotFinite(value));
        }
        Ok(Cutoff::Threshold(value))
    }

    pub fn bands(boundaries: Vec<Boundary>) -> Result<Self, CutoffError> {
        if boundaries.is_empty() {
            return Err(CutoffError::Empty);
        }
        for b in &boundaries {
            if !b.value.is_finite() {
                return Err(CutoffError::NotFinite(b.value));
            }
        }
        for pair in boundaries.windows(2) {
            if pair[1].value <= pair[0].value {
                return Err(CutoffError::NotAscending {
                    previous: pair[0].value,
                    next: pair[1].value,
                });
            }
        }
        Ok(Cutoff::Bands(boundaries))
    }

    /// Predicted class index for `score`.
    ///
    /// Threshold: `1` when `score >= t`, else `0`.
    /// Bands: index of the first boundary that admits the score; a score no boundary
    /// admits falls into the last class.
    pub fn classify(&self, score: f64) -> usize {
        match self {
            Cutoff::Threshold(t) => usize::from(score >= *t),
            Cutoff::Bands(boundaries) => boundaries
                .iter()
                .position(|b| b.admits(score))
                .unwrap_or(boundaries.len() - 1),
        }
    }

    /// Number of classes this cutoff can produce: one per band.
    pub fn class_count(&self) -> usize {
        match self {
            Cutoff::Threshold(_) => 2,
            Cutoff::Bands(boundaries) => boundaries.len(),
        }
    }

    pub fn is_multiclass(&self) -> bool {
        self.class_count() > 2
    }
}

/// Free-function form of [`Cutoff::classify`].
pub fn classify(score: f64, cutoff: &Cutoff) -> usize {
    cutoff.classify(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_inclusive_on_positive_side() {
        let c = Cutoff::default();
        assert_eq!(c.classify(0.49), 0);
        assert_eq!(c.classify(0.5), 1);
        assert_eq!(c.classify(0.6), 1);
    }

    #[test]
    fn test_threshold_is_monotonic() {
        let c = Cutoff::threshold(0.37).unwrap();
        let mut last = 0;
        for i in 0..=1000 {
            let class = c.classify(i as f64 / 1000.0);
            assert!(class >= last);
            last = class;
        }
    }

    #[test]
    fn test_three_bands() {
        let c = Cutoff::bands(vec![
            Boundary::below(0.3),
            Boundary::below(0.6),
            Boundary::below(1.0),
        ])
        .unwrap();
        assert_eq!(c.classify(0.1), 0);
        assert_eq!(c.classify(0.45), 1);
        assert_eq!(c.classify(0.9), 2);
        // above every boundary: last class
        assert_eq!(c.classify(1.5), 2);
        assert!(c.is_multiclass());
    }

    #[test]
    fn test_class_count_matches_reachable_classes() {
        assert_eq!(Cutoff::default().class_count(), 2);
        let single = Cutoff::bands(vec![Boundary::below(0.5)]).unwrap();
        assert_eq!(single.class_count(), 1);
        assert_eq!(single.classify(0.1), 0);
        assert_eq!(single.classify(0.9), 0);
        assert!(!single.is_multiclass());
        let two = Cutoff::bands(vec![Boundary::below(0.5), Boundary::below(1.0)]).unwrap();
        assert_eq!(two.class_count(), 2);
    }

    #[test]
    fn test_inclusive_boundary() {
        let c = Cutoff::bands(vec![Boundary::at_most(0.3), Boundary::below(1.0)]).unwrap();
        assert_eq!(c.classify(0.3), 0);
        let c = Cutoff::bands(vec![Boundary::below(0.3), Boundary::below(1.0)]).unwrap();
        assert_eq!(c.classify(0.3), 1);
    }

    #[test]
    fn test_malformed_bands_rejected() {
        assert_eq!(Cutoff::bands(vec![]), Err(CutoffError::Empty));
        assert!(matches!(
            Cutoff::bands(vec![Boundary::below(0.6), Boundary::below(0.3)]),
            Err(CutoffError::NotAscending { .. })
        ));
        assert!(matches!(
            Cutoff::bands(vec![Boundary::below(0.3), Boundary::below(0.3)]),
            Err(CutoffError::NotAscending { .. })
        ));
        assert!(Cutoff::threshold(f64::NAN).is_err());
    }
}
