//! vpmbench-common: Shared types, errors, and configuration used across all vpmbench crates.

pub mod error;
pub mod enums;
pub mod dataset;
pub mod scores;
pub mod classes;
pub mod bench_config;

// Re-export commonly used types
pub use error::{BenchError, Result};
pub use enums::{ReferenceGenome, VariationType};
pub use dataset::{EvaluationData, EvaluationDataEntry, Uid, VariantRow, VALID_CHROMOSOMES};
pub use scores::{ScoreRow, ScoreTable};
pub use classes::ClassMap;
pub use bench_config::BenchConfig;
