//! VariSNP benchmark tables (tab-delimited, benign hg38 SNPs).

use std::path::Path;

use serde::Deserialize;
use vpmbench_common::{EvaluationDataEntry, ReferenceGenome, Result, VariationType};

use crate::extractor::{extraction, Extractor};

#[derive(Debug, Deserialize)]
struct VariSnpRecord {
    hgvs_names: String,
    asn_to: u64,
    minor_allele: String,
    reference_allele: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VariSnpExtractor;

/// Chromosome from the first HGVS name, e.g. `NC_000023.11:g.100A>G` → `X`.
fn chromosome(hgvs_names: &str) -> Option<String> {
    let accession = hgvs_names.split(';').next()?.split(':').next()?;
    let number: u32 = accession.get(3..9)?.parse().ok()?;
    match number {
        1..=22 => Some(number.to_string()),
        23 => Some("X".to_string()),
        24 => Some("Y".to_string()),
        _ => None,
    }
}

impl Extractor for VariSnpExtractor {
    fn name(&self) -> &'static str {
        "VariSnpExtractor"
    }

    fn read_entries(&self, path: &Path) -> Result<Vec<EvaluationDataEntry>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .from_path(path)
            .map_err(|e| extraction(path, e))?;
        reader
            .deserialize::<VariSnpRecord>()
            .enumerate()
            .map(|(line, record)| {
                let record = record.map_err(|e| extraction(path, e))?;
                let chrom = chromosome(&record.hgvs_names).ok_or_else(|| {
                    extraction(path, format!("row {line}: cannot read chromosome from '{}'", record.hgvs_names))
                })?;
                Ok(EvaluationDataEntry::new(
                    chrom,
                    record.asn_to + 1,
                    record.reference_allele,
                    record.minor_allele,
                    ReferenceGenome::Hg38,
                    VariationType::Snp,
                    "benign",
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chromosome_from_hgvs() {
        assert_eq!(chromosome("NC_000001.11:g.12345A>G;NM_1:c.1A>G").as_deref(), Some("1"));
        assert_eq!(chromosome("NC_000023.11:g.5C>T").as_deref(), Some("X"));
        assert_eq!(chromosome("NC_000024.10:g.5C>T").as_deref(), Some("Y"));
        assert_eq!(chromosome("NC_000099.1:g.5C>T"), None);
        assert_eq!(chromosome("garbage"), None);
    }

    #[test]
    fn test_extract_varisnp() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "hgvs_names\tasn_to\tminor_allele\treference_allele\n\
             NC_000007.14:g.1000A>G\t999\tG\tA\n",
        )
        .unwrap();
        let data = VariSnpExtractor.extract(file.path()).unwrap();
        assert_eq!(data.rows()[0].chrom, "7");
        assert_eq!(data.rows()[0].pos, 1000);
        assert_eq!(data.expected_class(0), Some("benign"));
    }
}
