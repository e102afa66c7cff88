//! Evaluation dataset: validated, uid-keyed variant records.
//!
//! Extractors hand over plain [`EvaluationDataEntry`] records; [`EvaluationData::from_records`]
//! assigns dense uids in input order and validates every row before anything else can see
//! the data. A dataset that fails validation is never constructed.

use serde::{Deserialize, Serialize};

use crate::enums::{ReferenceGenome, VariationType};
use crate::error::{BenchError, Result};

/// Dense row identifier, `0..n` in extraction order.
pub type Uid = usize;

/// Chromosome names accepted in a dataset.
pub const VALID_CHROMOSOMES: [&str; 25] = [
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "17",
    "18", "19", "20", "21", "22", "X", "Y", "MT",
];

/// Maximum number of individual violations spelled out in a validation error.
const MAX_REPORTED_VIOLATIONS: usize = 10;

/// One variant observation as produced by an extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDataEntry {
    pub chrom: String,
    /// 1-based position
    pub pos: u64,
    pub ref_allele: String,
    pub alt_allele: String,
    pub reference_genome: ReferenceGenome,
    pub variation_type: VariationType,
    /// Expected class label, e.g. "benign" / "pathogenic"
    pub expected_class: String,
}

impl EvaluationDataEntry {
    pub fn new(
        chrom: impl Into<String>,
        pos: u64,
        ref_allele: impl Into<String>,
        alt_allele: impl Into<String>,
        reference_genome: ReferenceGenome,
        variation_type: VariationType,
        expected_class: impl Into<String>,
    ) -> Self {
        Self {
            chrom: chrom.into(),
            pos,
            ref_allele: ref_allele.into(),
            alt_allele: alt_allele.into(),
            reference_genome,
            variation_type,
            expected_class: expected_class.into(),
        }
    }

    fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !VALID_CHROMOSOMES.contains(&self.chrom.as_str()) {
            out.push(format!("CHROM '{}' is not one of 1..22, X, Y, MT", self.chrom));
        }
        if self.pos < 1 {
            out.push("POS must be >= 1".to_string());
        }
        if !is_sequence(&self.ref_allele, false) {
            out.push(format!("REF '{}' is not a sequence over A,C,G,T,N", self.ref_allele));
        }
        if !is_sequence(&self.alt_allele, true) {
            out.push(format!("ALT '{}' is not a sequence over A,C,G,T,N,*", self.alt_allele));
        }
        if self.expected_class.trim().is_empty() {
            out.push("CLASS is empty".to_string());
        }
        out
    }
}

fn is_sequence(bases: &str, allow_star: bool) -> bool {
    !bases.is_empty()
        && bases
            .chars()
            .all(|c| matches!(c, 'A' | 'C' | 'G' | 'T' | 'N') || (allow_star && c == '*'))
}

/// The variant columns of a dataset row (`UID, CHROM, POS, REF, ALT, RG, TYPE`).
///
/// This is what plugins get to see; the expected class is kept out of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRow {
    #[serde(rename = "UID")]
    pub uid: Uid,
    #[serde(rename = "CHROM")]
    pub chrom: String,
    #[serde(rename = "POS")]
    pub pos: u64,
    #[serde(rename = "REF")]
    pub ref_allele: String,
    #[serde(rename = "ALT")]
    pub alt_allele: String,
    #[serde(rename = "RG")]
    pub reference_genome: ReferenceGenome,
    #[serde(rename = "TYPE")]
    pub variation_type: VariationType,
}

/// A validated evaluation dataset. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationData {
    rows: Vec<VariantRow>,
    expected_classes: Vec<String>,
}

impl EvaluationData {
    /// Assign uids `0..n` in input order and validate every record.
    ///
    /// Validation is all-or-nothing: any violation fails the whole dataset with an
    /// extraction error listing the offending rows.
    pub fn from_records(records: Vec<EvaluationDataEntry>) -> Result<Self> {
        let mut problems = Vec::new();
        for (uid, record) in records.iter().enumerate() {
            for violation in record.violations() {
                problems.push(format!("row {uid}: {violation}"));
            }
        }
        if !problems.is_empty() {
            let total = problems.len();
            problems.truncate(MAX_REPORTED_VIOLATIONS);
            let mut message = format!("dataset failed validation ({total} violations): ");
            message.push_str(&problems.join("; "));
            if total > MAX_REPORTED_VIOLATIONS {
                message.push_str("; ...");
            }
            return Err(BenchError::Extraction(message));
        }

        let mut rows = Vec::with_capacity(records.len());
        let mut expected_classes = Vec::with_capacity(records.len());
        for (uid, record) in records.into_iter().enumerate() {
            rows.push(VariantRow {
                uid,
                chrom: record.chrom,
                pos: record.pos,
                ref_allele: record.ref_allele,
                alt_allele: record.alt_allele,
                reference_genome: record.reference_genome,
                variation_type: record.variation_type,
            });
            expected_classes.push(record.expected_class.trim().to_string());
        }
        Ok(Self { rows, expected_classes })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Variant columns in uid order.
    pub fn rows(&self) -> &[VariantRow] {
        &self.rows
    }

    pub fn row(&self, uid: Uid) -> Option<&VariantRow> {
        self.rows.get(uid)
    }

    /// Expected class labels, indexed by uid.
    pub fn expected_classes(&self) -> &[String] {
        &self.expected_classes
    }

    pub fn expected_class(&self, uid: Uid) -> Option<&str> {
        self.expected_classes.get(uid).map(String::as_str)
    }

    pub fn uids(&self) -> impl Iterator<Item = Uid> + '_ {
        self.rows.iter().map(|r| r.uid)
    }

    /// A new dataset holding only the rows the filter keeps, re-numbered from 0.
    pub fn subset<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&VariantRow, &str) -> bool,
    {
        let mut rows = Vec::new();
        let mut expected_classes = Vec::new();
        for (row, class) in self.rows.iter().zip(&self.expected_classes) {
            if keep(row, class) {
                let mut row = row.clone();
                row.uid = rows.len();
                rows.push(row);
                expected_classes.push(class.clone());
            }
        }
        Self { rows, expected_classes }
    }
}
