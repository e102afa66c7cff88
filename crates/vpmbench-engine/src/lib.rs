//! vpmbench-engine: The Execution Engine and Report Builder.
//!
//! [`run_pipeline`] drives one benchmark run: extract the dataset, discover and select
//! plugins, dispatch them with bounded parallelism, merge their scores by uid, classify
//! them against each plugin's cutoff and compute the configured statistics.

pub mod state;
pub mod engine;
pub mod merge;
pub mod report;
pub mod pipeline;

pub use engine::{EngineOptions, ExecutionEngine, PluginOutcome};
pub use merge::{merge, ExcludedPlugin, MergedDataset, MergedRecord, PluginColumn};
pub use pipeline::{run_pipeline, statistics, RunRequest};
pub use report::{PerformanceReport, ReportBuilder, ReportCell, StatisticInfo};
pub use state::EngineState;
