//! Mapping from expected-class labels to class indices.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataset::EvaluationData;
use crate::error::{BenchError, Result};

/// Label → class index, e.g. `{benign: 0, pathogenic: 1}`.
///
/// Labels are matched case-insensitively. The highest index is the positive
/// (most pathogenic) class, which matches the polarity the cutoff resolver uses:
/// higher scores land in higher classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, usize>", into = "BTreeMap<String, usize>")]
pub struct ClassMap(BTreeMap<String, usize>);

impl From<BTreeMap<String, usize>> for ClassMap {
    fn from(map: BTreeMap<String, usize>) -> Self {
        Self::from_pairs(map)
    }
}

impl From<ClassMap> for BTreeMap<String, usize> {
    fn from(map: ClassMap) -> Self {
        map.0
    }
}

impl Default for ClassMap {
    fn default() -> Self {
        Self::binary()
    }
}

impl ClassMap {
    pub fn binary() -> Self {
        Self::from_pairs([("benign", 0), ("pathogenic", 1)])
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: AsRef<str>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(label, class)| (normalise(label.as_ref()), class))
                .collect(),
        )
    }

    pub fn resolve(&self, label: &str) -> Option<usize> {
        self.0.get(&normalise(label)).copied()
    }

    /// Number of distinct class indices, i.e. `max index + 1`.
    pub fn class_count(&self) -> usize {
        self.0.values().max().map_or(0, |m| m + 1)
    }

    pub fn positive_class(&self) -> usize {
        self.0.values().max().copied().unwrap_or(0)
    }

    pub fn is_multiclass(&self) -> bool {
        self.class_count() > 2
    }

    pub fn labels(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(l, c)| (l.as_str(), *c))
    }

    /// Resolve every expected label of a dataset, failing on the first label the map
    /// does not know.
    pub fn resolve_all(&self, data: &EvaluationData) -> Result<Vec<usize>> {
        data.expected_classes()
            .iter()
            .enumerate()
            .map(|(uid, label)| {
                self.resolve(label).ok_or_else(|| {
                    BenchError::Extraction(format!(
                        "row {uid}: CLASS '{label}' is not in the class map ({})",
                        self.0.keys().cloned().collect::<Vec<_>>().join(", ")
                    ))
                })
            })
            .collect()
    }
}

fn normalise(label: &str) -> String {
    label.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_binary_pathogenic_positive() {
        let map = ClassMap::default();
        assert_eq!(map.resolve("Pathogenic"), Some(1));
        assert_eq!(map.resolve(" benign "), Some(0));
        assert_eq!(map.positive_class(), 1);
        assert!(!map.is_multiclass());
    }

    #[test]
    fn test_multiclass_map() {
        let map = ClassMap::from_pairs([
            ("benign", 0),
            ("likely pathogenic", 1),
            ("pathogenic", 2),
        ]);
        assert_eq!(map.class_count(), 3);
        assert!(map.is_multiclass());
        assert_eq!(map.resolve("Likely Pathogenic"), Some(1));
    }
}
