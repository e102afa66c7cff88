use std::path::Path;

use tracing::{debug, info};
use vpmbench_common::{BenchError, EvaluationData, EvaluationDataEntry, Result};

use crate::{ClinVarVcfExtractor, CsvExtractor};

/// Turns one input file format into evaluation records.
pub trait Extractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Parse `path` into unvalidated records.
    fn read_entries(&self, path: &Path) -> Result<Vec<EvaluationDataEntry>>;

    /// Parse and validate `path`. Any failure is a [`BenchError::Extraction`].
    fn extract(&self, path: &Path) -> Result<EvaluationData> {
        let entries = self.read_entries(path).map_err(|e| match e {
            BenchError::Extraction(_) => e,
            other => BenchError::Extraction(format!(
                "cannot parse {} with {}: {other}",
                path.display(),
                self.name()
            )),
        })?;
        debug!(extractor = self.name(), records = entries.len(), "Read evaluation records");
        let data = EvaluationData::from_records(entries)?;
        info!(path = %path.display(), variants = data.len(), "Extracted evaluation data");
        Ok(data)
    }
}

/// Default extractor for a file: `.csv` files use [`CsvExtractor`], everything else is
/// read as a ClinVar VCF.
pub fn extractor_for(path: &Path) -> Box<dyn Extractor> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        Box::new(CsvExtractor::default())
    } else {
        Box::new(ClinVarVcfExtractor)
    }
}

/// Extract `path` with `extractor`, or with [`extractor_for`] when none is given.
pub fn extract_evaluation_data(path: &Path, extractor: Option<&dyn Extractor>) -> Result<EvaluationData> {
    match extractor {
        Some(extractor) => extractor.extract(path),
        None => extractor_for(path).extract(path),
    }
}

pub(crate) fn extraction(path: &Path, message: impl std::fmt::Display) -> BenchError {
    BenchError::Extraction(format!("{}: {message}", path.display()))
}
