//! vpmbench-ingestion: Extractors turning raw variant files into validated
//! [`EvaluationData`](vpmbench_common::EvaluationData).
//!
//! Every extractor produces the `UID, CHROM, POS, REF, ALT, RG, TYPE, CLASS` table and
//! validates it before returning; a file that cannot be read or does not validate is an
//! extraction error and no partial dataset is produced.

pub mod extractor;
pub mod csv_table;
pub mod clinvar;
pub mod varisnp;

pub use clinvar::ClinVarVcfExtractor;
pub use csv_table::CsvExtractor;
pub use extractor::{extract_evaluation_data, extractor_for, Extractor};
pub use varisnp::VariSnpExtractor;
