//! Raw plugin output: `UID → SCORE` tables.

use serde::{Deserialize, Serialize};

use crate::dataset::Uid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    #[serde(rename = "UID")]
    pub uid: Uid,
    #[serde(rename = "SCORE")]
    pub score: f64,
}

/// Scores as returned by a plugin, before they are checked against the dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreTable {
    rows: Vec<ScoreRow>,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, uid: Uid, score: f64) {
        self.rows.push(ScoreRow { uid, score });
    }

    pub fn rows(&self) -> &[ScoreRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check the table against a dataset of `row_count` rows and return the scores
    /// indexed by uid.
    ///
    /// Every uid `0..row_count` must appear exactly once, no other uid may appear, and
    /// every score must be finite.
    pub fn align(&self, row_count: usize) -> Result<Vec<f64>, String> {
        let mut aligned: Vec<Option<f64>> = vec![None; row_count];
        for row in &self.rows {
            if !row.score.is_finite() {
                return Err(format!("SCORE for UID {} is not a finite number", row.uid));
            }
            let slot = aligned
                .get_mut(row.uid)
                .ok_or_else(|| format!("UID {} is not part of the dataset", row.uid))?;
            if slot.replace(row.score).is_some() {
                return Err(format!("UID {} is scored more than once", row.uid));
            }
        }

        let missing: Vec<String> = aligned
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_none())
            .map(|(uid, _)| uid.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(format!(
                "{} of {} rows have no score (UIDs {})",
                missing.len(),
                row_count,
                abbreviate(&missing)
            ));
        }

        Ok(aligned.into_iter().flatten().collect())
    }
}

impl FromIterator<(Uid, f64)> for ScoreTable {
    fn from_iter<I: IntoIterator<Item = (Uid, f64)>>(iter: I) -> Self {
        Self {
            rows: iter
                .into_iter()
                .map(|(uid, score)| ScoreRow { uid, score })
                .collect(),
        }
    }
}

fn abbreviate(items: &[String]) -> String {
    const SHOWN: usize = 5;
    if items.len() <= SHOWN {
        items.join(", ")
    } else {
        format!("{}, ...", items[..SHOWN].join(", "))
    }
}
