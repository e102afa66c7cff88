//! File formats used on the container I/O contract.
//!
//! The manifest declares a format tag plus free-form arguments for the plugin's input
//! and output files. Tags and arguments are parsed when the plugin is built, so an
//! unknown tag is a manifest error rather than an invocation-time surprise.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;
use vpmbench_common::{ScoreTable, Uid, VariantRow};

use crate::error::{ExecutionError, ManifestError};

/// A variant column that can be written to, or matched from, a plugin file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Column {
    Uid,
    Chrom,
    Pos,
    Ref,
    Alt,
    Rg,
    Type,
}

impl Column {
    fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "UID" => Some(Column::Uid),
            "CHROM" => Some(Column::Chrom),
            "POS" => Some(Column::Pos),
            "REF" => Some(Column::Ref),
            "ALT" => Some(Column::Alt),
            "RG" => Some(Column::Rg),
            "TYPE" => Some(Column::Type),
            _ => None,
        }
    }

    pub fn header(&self) -> &'static str {
        match self {
            Column::Uid => "UID",
            Column::Chrom => "CHROM",
            Column::Pos => "POS",
            Column::Ref => "REF",
            Column::Alt => "ALT",
            Column::Rg => "RG",
            Column::Type => "TYPE",
        }
    }

    pub fn value(&self, row: &VariantRow) -> String {
        match self {
            Column::Uid => row.uid.to_string(),
            Column::Chrom => row.chrom.clone(),
            Column::Pos => row.pos.to_string(),
            Column::Ref => row.ref_allele.clone(),
            Column::Alt => row.alt_allele.clone(),
            Column::Rg => row.reference_genome.to_string(),
            Column::Type => row.variation_type.to_string(),
        }
    }
}

const DEFAULT_KEY_COLUMNS: [Column; 4] = [Column::Chrom, Column::Pos, Column::Ref, Column::Alt];

// ── Input ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvInput {
    pub separator: u8,
    pub header: bool,
    pub columns: Vec<Column>,
}

/// Format the dataset is converted into before a container sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InputFormat {
    Csv(CsvInput),
    Vcf,
}

impl InputFormat {
    pub fn parse(tag: &str, args: &Mapping) -> Result<Self, ManifestError> {
        const DIRECTION: &str = "input";
        match tag.trim().to_ascii_uppercase().as_str() {
            "CSV" => Ok(InputFormat::Csv(CsvInput {
                separator: separator_arg(args, DIRECTION)?.unwrap_or(b','),
                header: bool_arg(args, "header", DIRECTION)?.unwrap_or(true),
                columns: columns_arg(args, &["columns"], DIRECTION)?
                    .unwrap_or_else(|| DEFAULT_KEY_COLUMNS.to_vec()),
            })),
            "VCF" => Ok(InputFormat::Vcf),
            _ => Err(ManifestError::UnknownFormat {
                direction: DIRECTION,
                tag: tag.to_string(),
            }),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            InputFormat::Csv(_) => "csv",
            InputFormat::Vcf => "vcf",
        }
    }

    /// Write `rows` to `path` in this format.
    pub fn write(&self, rows: &[VariantRow], path: &Path) -> Result<(), ExecutionError> {
        match self {
            InputFormat::Csv(args) => write_csv(args, rows, path),
            InputFormat::Vcf => write_vcf(rows, path),
        }
    }
}

fn write_csv(args: &CsvInput, rows: &[VariantRow], path: &Path) -> Result<(), ExecutionError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(args.separator)
        .has_headers(false)
        .from_path(path)
        .map_err(|e| ExecutionError::Io(e.into()))?;
    if args.header {
        writer
            .write_record(args.columns.iter().map(Column::header))
            .map_err(|e| ExecutionError::Io(e.into()))?;
    }
    for row in rows {
        writer
            .write_record(args.columns.iter().map(|c| c.value(row)))
            .map_err(|e| ExecutionError::Io(e.into()))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_vcf(rows: &[VariantRow], path: &Path) -> Result<(), ExecutionError> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "##fileformat=VCFv4.1")?;
    writeln!(out, "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO")?;
    for row in rows {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t40\t.\t.",
            row.chrom, row.pos, row.uid, row.ref_allele, row.alt_allele
        )?;
    }
    out.flush()?;
    Ok(())
}

// ── Output ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvOutput {
    pub separator: u8,
    /// Columns used to join output lines back to dataset rows; empty means the file
    /// carries a `UID` column.
    pub merge_on: Vec<Column>,
}

/// Format of the file a container leaves behind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OutputFormat {
    Csv(CsvOutput),
}

impl OutputFormat {
    pub fn parse(tag: &str, args: &Mapping) -> Result<Self, ManifestError> {
        const DIRECTION: &str = "output";
        match tag.trim().to_ascii_uppercase().as_str() {
            "CSV" => Ok(OutputFormat::Csv(CsvOutput {
                separator: separator_arg(args, DIRECTION)?.unwrap_or(b','),
                merge_on: columns_arg(args, &["merge-on", "merge_on"], DIRECTION)?
                    .unwrap_or_else(|| DEFAULT_KEY_COLUMNS.to_vec()),
            })),
            _ => Err(ManifestError::UnknownFormat {
                direction: DIRECTION,
                tag: tag.to_string(),
            }),
        }
    }

    /// Read `path` back into a `UID → SCORE` table for `rows`.
    pub fn read(&self, path: &Path, rows: &[VariantRow]) -> Result<ScoreTable, ExecutionError> {
        match self {
            OutputFormat::Csv(args) => read_csv(args, path, rows),
        }
    }
}

fn read_csv(args: &CsvOutput, path: &Path, rows: &[VariantRow]) -> Result<ScoreTable, ExecutionError> {
    if !path.is_file() {
        return Err(ExecutionError::MalformedOutput(format!(
            "output file {} is missing",
            path.display()
        )));
    }
    let malformed = |e: csv::Error| ExecutionError::MalformedOutput(e.to_string());

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(args.separator)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(malformed)?;
    let headers = reader.headers().map_err(malformed)?.clone();
    let find = |name: &str| -> Result<usize, ExecutionError> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| ExecutionError::MalformedOutput(format!("output has no '{name}' column")))
    };

    let score_idx = find("SCORE")?;
    let key_columns: Vec<Column> = if args.merge_on.is_empty() {
        vec![Column::Uid]
    } else {
        args.merge_on.clone()
    };
    let key_idx = key_columns
        .iter()
        .map(|c| find(c.header()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut index: HashMap<Vec<String>, Vec<Uid>> = HashMap::new();
    for row in rows {
        let key = key_columns.iter().map(|c| c.value(row)).collect();
        index.entry(key).or_default().push(row.uid);
    }

    let mut table = ScoreTable::new();
    let mut unmatched = 0usize;
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(malformed)?;
        let raw = record.get(score_idx).unwrap_or_default();
        let score: f64 = raw.parse().map_err(|_| {
            ExecutionError::MalformedOutput(format!(
                "SCORE '{raw}' on data line {} is not numeric",
                line + 1
            ))
        })?;
        let key: Vec<String> = key_idx
            .iter()
            .map(|&i| record.get(i).unwrap_or_default().to_string())
            .collect();
        match index.get(&key) {
            Some(uids) => uids.iter().for_each(|&uid| table.push(uid, score)),
            None => unmatched += 1,
        }
    }
    if unmatched > 0 {
        debug!(unmatched, "Output lines without a matching dataset row were ignored");
    }
    Ok(table)
}

// ── Argument helpers ──────────────────────────────────────────────────────────

fn lookup<'a>(args: &'a Mapping, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| args.get(*k))
}

fn separator_arg(args: &Mapping, direction: &'static str) -> Result<Option<u8>, ManifestError> {
    let Some(value) = lookup(args, &["separator", "sep", "delimiter"]) else {
        return Ok(None);
    };
    let text = value.as_str().ok_or_else(|| ManifestError::FormatArgs {
        direction,
        message: "separator must be a string".to_string(),
    })?;
    let text = if text == "\\t" { "\t" } else { text };
    match text.as_bytes() {
        [b] => Ok(Some(*b)),
        _ => Err(ManifestError::FormatArgs {
            direction,
            message: format!("separator '{text}' must be a single ASCII character"),
        }),
    }
}

fn bool_arg(args: &Mapping, key: &str, direction: &'static str) -> Result<Option<bool>, ManifestError> {
    match args.get(key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(ManifestError::FormatArgs {
            direction,
            message: format!("'{key}' must be true or false"),
        }),
    }
}

fn columns_arg(
    args: &Mapping,
    keys: &[&str],
    direction: &'static str,
) -> Result<Option<Vec<Column>>, ManifestError> {
    let Some(value) = lookup(args, keys) else {
        return Ok(None);
    };
    let items = value.as_sequence().ok_or_else(|| ManifestError::FormatArgs {
        direction,
        message: format!("'{}' must be a list of column names", keys[0]),
    })?;
    items
        .iter()
        .map(|item| {
            item.as_str().and_then(Column::parse).ok_or_else(|| ManifestError::FormatArgs {
                direction,
                message: format!("unknown column {item:?}"),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vpmbench_common::{ReferenceGenome, VariationType};

    fn rows() -> Vec<VariantRow> {
        vec![
            VariantRow {
                uid: 0,
                chrom: "1".to_string(),
                pos: 100,
                ref_allele: "A".to_string(),
                alt_allele: "G".to_string(),
                reference_genome: ReferenceGenome::Hg19,
                variation_type: VariationType::Snp,
            },
            VariantRow {
                uid: 1,
                chrom: "X".to_string(),
                pos: 2000,
                ref_allele: "C".to_string(),
                alt_allele: "T".to_string(),
                reference_genome: ReferenceGenome::Hg19,
                variation_type: VariationType::Snp,
            },
        ]
    }

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_unknown_tag_is_manifest_error() {
        let err = InputFormat::parse("parquet", &Mapping::new()).unwrap_err();
        assert!(matches!(err, ManifestError::UnknownFormat { direction: "input", .. }));
        assert!(OutputFormat::parse("VCF", &Mapping::new()).is_err());
    }

    #[test]
    fn test_csv_input_args() {
        let fmt = InputFormat::parse("csv", &mapping("separator: \"\\t\"\nheader: false\ncolumns: [UID, CHROM]")).unwrap();
        assert_eq!(
            fmt,
            InputFormat::Csv(CsvInput {
                separator: b'\t',
                header: false,
                columns: vec![Column::Uid, Column::Chrom],
            })
        );
        assert!(InputFormat::parse("CSV", &mapping("columns: [NOPE]")).is_err());
        assert!(InputFormat::parse("CSV", &mapping("separator: ';;'")).is_err());
    }

    #[test]
    fn test_csv_write_then_read_by_variant_key() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        InputFormat::parse("CSV", &Mapping::new()).unwrap().write(&rows(), &input).unwrap();
        let written = std::fs::read_to_string(&input).unwrap();
        assert_eq!(written, "CHROM,POS,REF,ALT\n1,100,A,G\nX,2000,C,T\n");

        let output = dir.path().join("out.csv");
        std::fs::write(&output, "CHROM,POS,REF,ALT,SCORE\nX,2000,C,T,0.8\n1,100,A,G,0.2\n7,1,A,C,0.5\n").unwrap();
        let table = OutputFormat::parse("CSV", &Mapping::new()).unwrap().read(&output, &rows()).unwrap();
        assert_eq!(table.align(2).unwrap(), vec![0.2, 0.8]);
    }

    #[test]
    fn test_read_by_uid_when_merge_on_empty() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.tsv");
        std::fs::write(&output, "UID\tSCORE\n1\t0.3\n0\t0.7\n").unwrap();
        let fmt = OutputFormat::parse("CSV", &mapping("separator: \"\\t\"\nmerge-on: []")).unwrap();
        let table = fmt.read(&output, &rows()).unwrap();
        assert_eq!(table.align(2).unwrap(), vec![0.7, 0.3]);
    }

    #[test]
    fn test_read_rejects_missing_file_and_bad_scores() {
        let dir = tempfile::tempdir().unwrap();
        let fmt = OutputFormat::parse("CSV", &Mapping::new()).unwrap();
        let missing = fmt.read(&dir.path().join("nope.csv"), &rows()).unwrap_err();
        assert!(matches!(missing, ExecutionError::MalformedOutput(_)));

        let output = dir.path().join("out.csv");
        std::fs::write(&output, "CHROM,POS,REF,ALT,SCORE\n1,100,A,G,high\n").unwrap();
        assert!(matches!(fmt.read(&output, &rows()), Err(ExecutionError::MalformedOutput(_))));

        std::fs::write(&output, "CHROM,POS,SCORE\n1,100,0.1\n").unwrap();
        assert!(fmt.read(&output, &rows()).unwrap_err().to_string().contains("'REF'"));
    }

    #[test]
    fn test_vcf_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.vcf");
        InputFormat::Vcf.write(&rows(), &input).unwrap();
        let written = std::fs::read_to_string(&input).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "##fileformat=VCFv4.1");
        assert_eq!(lines[2], "1\t100\t0\tA\tG\t40\t.\t.");
    }
}
