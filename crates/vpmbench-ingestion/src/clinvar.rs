//! ClinVar VCF files.
//!
//! The genome comes from the `##reference=` header, the expected class from the first
//! `INFO/CLNSIG` value. Only the first ALT allele of a record is used.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;
use vpmbench_common::{EvaluationDataEntry, ReferenceGenome, Result, VariationType};

use crate::extractor::{extraction, Extractor};

#[derive(Debug, Clone, Copy, Default)]
pub struct ClinVarVcfExtractor;

/// Map a CLNSIG value onto the binary label space.
///
/// ClinVar also uses numeric codes: `2` is benign, `5` pathogenic.
pub fn resolve_clnsig(value: &str) -> Option<&'static str> {
    let value = value.trim().to_ascii_lowercase();
    if value.contains("benign") || value == "2" {
        Some("benign")
    } else if value.contains("pathogenic") || value == "5" {
        Some("pathogenic")
    } else {
        None
    }
}

fn info_value<'a>(info: &'a str, key: &str) -> Option<&'a str> {
    info.split(';').find_map(|field| {
        let (k, v) = field.split_once('=')?;
        (k == key).then_some(v)
    })
}

impl Extractor for ClinVarVcfExtractor {
    fn name(&self) -> &'static str {
        "ClinVarVcfExtractor"
    }

    fn read_entries(&self, path: &Path) -> Result<Vec<EvaluationDataEntry>> {
        let file = File::open(path).map_err(|e| extraction(path, e))?;
        let mut genome: Option<ReferenceGenome> = None;
        let mut entries = Vec::new();

        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| extraction(path, e))?;
            let lineno = idx + 1;
            if let Some(meta) = line.strip_prefix("##") {
                if let Some(reference) = meta.strip_prefix("reference=") {
                    genome = Some(ReferenceGenome::resolve(reference).ok_or_else(|| {
                        extraction(path, format!("unknown reference genome '{reference}'"))
                    })?);
                }
                continue;
            }
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 8 {
                return Err(extraction(path, format!("line {lineno}: expected 8 VCF columns, found {}", fields.len())));
            }
            let reference_genome =
                genome.ok_or_else(|| extraction(path, "VCF header has no ##reference line"))?;
            let pos: u64 = fields[1]
                .parse()
                .map_err(|_| extraction(path, format!("line {lineno}: POS '{}' is not a number", fields[1])))?;
            let ref_allele = fields[3];
            let alt_allele = fields[4].split(',').next().unwrap_or_default();
            let clnsig = info_value(fields[7], "CLNSIG")
                .and_then(|v| v.split(',').next())
                .ok_or_else(|| extraction(path, format!("line {lineno}: INFO has no CLNSIG")))?;
            let class = resolve_clnsig(clnsig)
                .ok_or_else(|| extraction(path, format!("line {lineno}: cannot resolve CLNSIG '{clnsig}'")))?;
            let variation_type = if ref_allele.len() == 1 && alt_allele.len() == 1 {
                VariationType::Snp
            } else {
                VariationType::Indel
            };

            entries.push(EvaluationDataEntry::new(
                fields[0],
                pos,
                ref_allele,
                alt_allele,
                reference_genome,
                variation_type,
                class,
            ));
        }
        debug!(records = entries.len(), genome = ?genome, "Parsed ClinVar VCF");
        Ok(entries)
    }
}
