//! vpmbench: Benchmark variant prioritization methods against a labelled dataset.
//! Entry point for the command-line binary.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vpmbench_common::{BenchConfig, ReferenceGenome, VariationType};
use vpmbench_engine::{run_pipeline, EngineOptions, RunRequest};
use vpmbench_ingestion::{ClinVarVcfExtractor, CsvExtractor, Extractor, VariSnpExtractor};
use vpmbench_plugins::{predicates, DockerCli, Invokers, PluginPredicate, PluginRegistry, ScorerCatalog};

#[derive(Parser)]
#[command(name = "vpmbench", author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to $VPMBENCH_CONFIG, then ./vpmbench.toml)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the selected plugins against a dataset and report their performance
    Run {
        /// Dataset file (CSV or ClinVar VCF)
        dataset: PathBuf,
        /// Plugin root directory
        #[arg(long)]
        plugins: Option<PathBuf>,
        /// Only run plugins with these names (repeatable)
        #[arg(long = "plugin")]
        names: Vec<String>,
        /// Only run plugins trained with this database
        #[arg(long)]
        trained_with: Option<String>,
        /// Summaries/metrics to compute (repeatable; defaults to report.metrics)
        #[arg(long = "metric")]
        metrics: Vec<String>,
        /// Force an extractor instead of picking one from the file extension
        #[arg(long, value_enum)]
        extractor: Option<ExtractorKind>,
        /// Plugins invoked at once (0 = one per logical core)
        #[arg(long)]
        workers: Option<usize>,
        /// Per-plugin deadline in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Write the full report as JSON to this file
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// List the plugins found under the plugin root
    Plugins {
        /// Plugin root directory
        #[arg(long)]
        plugins: Option<PathBuf>,
    },
    /// List the available summaries and metrics
    Metrics,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExtractorKind {
    Csv,
    Clinvar,
    Varisnp,
}

impl ExtractorKind {
    fn build(self) -> Arc<dyn Extractor> {
        match self {
            ExtractorKind::Csv => Arc::new(CsvExtractor::default()),
            ExtractorKind::Clinvar => Arc::new(ClinVarVcfExtractor),
            ExtractorKind::Varisnp => Arc::new(VariSnpExtractor),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" })),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { dataset, plugins, names, trained_with, metrics, extractor, workers, timeout, json } => {
            if let Some(workers) = workers {
                config.execution.parallel_workers = workers;
            }
            if timeout.is_some() {
                config.execution.timeout_secs = timeout;
            }
            if !metrics.is_empty() {
                config.report.metrics = metrics;
            }
            let root = config::plugin_root(&config, plugins);

            let mut request = RunRequest::from_config(&dataset, &root, &config)?
                .with_predicate(selection(names, trained_with))
                .with_options(EngineOptions::from_config(&config));
            if let Some(kind) = extractor {
                request = request.with_extractor(kind.build());
            }

            info!(
                version = env!("CARGO_PKG_VERSION"),
                dataset = %dataset.display(),
                plugins = %root.display(),
                "Starting benchmark"
            );
            let report = run_pipeline(request, invokers(&config)).await?;

            print!("{}", report.render_metrics());
            if let Some(path) = json {
                std::fs::write(&path, report.to_json()?)
                    .with_context(|| format!("Could not write report to {}", path.display()))?;
                info!(path = %path.display(), "Report written");
            }
        }
        Commands::Plugins { plugins } => {
            let root = config::plugin_root(&config, plugins);
            let discovery = PluginRegistry::new(&root).scan()?;
            for plugin in &discovery.plugins {
                println!(
                    "{:<24} {:<8} {:<7} variations={} genomes={}",
                    plugin.name,
                    plugin.version.as_deref().unwrap_or("-"),
                    plugin.entry_point.mode(),
                    join(plugin.supported_variations.iter().map(VariationType::as_str)),
                    join(plugin.reference_genomes.iter().map(ReferenceGenome::as_str)),
                );
            }
            for rejected in &discovery.rejected {
                warn!(path = %rejected.path.display(), reason = %rejected.reason, "Rejected manifest");
            }
        }
        Commands::Metrics => {
            for name in vpmbench_metrics::available() {
                println!("{name}");
            }
        }
    }

    Ok(())
}

fn selection(names: Vec<String>, trained_with: Option<String>) -> PluginPredicate {
    let mut predicate = if names.is_empty() { predicates::all_plugins() } else { predicates::by_name(names) };
    if let Some(database) = trained_with {
        predicate = predicates::and(predicate, predicates::was_trained_with(database));
    }
    predicate
}

fn invokers(config: &BenchConfig) -> Arc<Invokers> {
    let runtime = Arc::new(DockerCli::from_config(&config.container));
    Arc::new(Invokers::new(ScorerCatalog::new(), runtime, config.execution.timeout()))
}

fn join<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.collect::<Vec<_>>().join(",")
}
