//! Plain delimited tables with `CHROM, POS, REF, ALT, CLASS` and optional `TYPE`, `RG`.

use std::path::Path;

use serde::Deserialize;
use vpmbench_common::{EvaluationDataEntry, ReferenceGenome, Result, VariationType};

use crate::extractor::{extraction, Extractor};

#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "CHROM")]
    chrom: String,
    #[serde(rename = "POS")]
    pos: u64,
    #[serde(rename = "REF")]
    ref_allele: String,
    #[serde(rename = "ALT")]
    alt_allele: String,
    #[serde(rename = "CLASS")]
    class: String,
    #[serde(rename = "TYPE", default)]
    variation_type: Option<String>,
    #[serde(rename = "RG", default)]
    reference_genome: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CsvExtractor {
    pub delimiter: u8,
    /// Used for rows without a `RG` value
    pub default_genome: ReferenceGenome,
    /// Used for rows without a `TYPE` value
    pub default_type: VariationType,
}

impl Default for CsvExtractor {
    fn default() -> Self {
        Self {
            delimiter: b',',
            default_genome: ReferenceGenome::Hg19,
            default_type: VariationType::Snp,
        }
    }
}

impl CsvExtractor {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_defaults(mut self, genome: ReferenceGenome, variation_type: VariationType) -> Self {
        self.default_genome = genome;
        self.default_type = variation_type;
        self
    }
}

impl Extractor for CsvExtractor {
    fn name(&self) -> &'static str {
        "CsvExtractor"
    }

    fn read_entries(&self, path: &Path) -> Result<Vec<EvaluationDataEntry>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| extraction(path, e))?;

        let mut entries = Vec::new();
        for (line, record) in reader.deserialize::<CsvRecord>().enumerate() {
            let record = record.map_err(|e| extraction(path, e))?;
            let variation_type = match record.variation_type.as_deref().filter(|t| !t.is_empty()) {
                Some(t) => VariationType::resolve(t)
                    .ok_or_else(|| extraction(path, format!("row {line}: unknown TYPE '{t}'")))?,
                None => self.default_type,
            };
            let reference_genome = match record.reference_genome.as_deref().filter(|g| !g.is_empty()) {
                Some(g) => ReferenceGenome::resolve(g)
                    .ok_or_else(|| extraction(path, format!("row {line}: unknown RG '{g}'")))?,
                None => self.default_genome,
            };
            entries.push(EvaluationDataEntry::new(
                record.chrom,
                record.pos,
                record.ref_allele,
                record.alt_allele,
                reference_genome,
                variation_type,
                record.class.to_ascii_lowercase(),
            ));
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vpmbench_common::BenchError;

    fn write(content: &str) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        std::fs::write(file.path(), content).unwrap();
        file
    }

    #[test]
    fn test_defaults_fill_missing_columns() {
        let file = write("CHROM,POS,REF,ALT,CLASS\n1,100,A,G,Pathogenic\nX,200,C,T,benign\n");
        let data = CsvExtractor::default().extract(file.path()).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.rows()[1].uid, 1);
        assert_eq!(data.rows()[0].reference_genome, ReferenceGenome::Hg19);
        assert_eq!(data.expected_class(0), Some("pathogenic"));
    }

    #[test]
    fn test_explicit_type_and_genome() {
        let file = write("CHROM\tPOS\tREF\tALT\tCLASS\tTYPE\tRG\n2\t5\tAT\tA\tbenign\tindel\tGRCh38\n");
        let data = CsvExtractor::default().with_delimiter(b'\t').extract(file.path()).unwrap();
        assert_eq!(data.rows()[0].variation_type, VariationType::Indel);
        assert_eq!(data.rows()[0].reference_genome, ReferenceGenome::Hg38);
    }

    #[test]
    fn test_failures_are_extraction_errors() {
        let bad_pos = write("CHROM,POS,REF,ALT,CLASS\n1,abc,A,G,benign\n");
        assert!(matches!(CsvExtractor::default().extract(bad_pos.path()), Err(BenchError::Extraction(_))));

        let bad_chrom = write("CHROM,POS,REF,ALT,CLASS\n1,1,A,G,benign\n99,1,A,G,benign\n");
        assert!(matches!(CsvExtractor::default().extract(bad_chrom.path()), Err(BenchError::Extraction(_))));

        let missing = std::path::Path::new("/definitely/not/here.csv");
        assert!(matches!(CsvExtractor::default().extract(missing), Err(BenchError::Extraction(_))));
    }
}
