//! Run configuration for benchmark runs.
//!
//! Loaded from TOML (or YAML) by the binary; every section and field has a default so a
//! partial file is enough.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classes::ClassMap;
use crate::error::{BenchError, Result};

/// Complete benchmark configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Where plugins are discovered
    #[serde(default)]
    pub plugins: PluginsConfig,

    /// Dispatch options
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Container runtime options
    #[serde(default)]
    pub container: ContainerConfig,

    /// Summaries and metrics to compute
    #[serde(default)]
    pub report: ReportConfig,

    /// Expected-class label → class index
    #[serde(default)]
    pub classes: ClassMap,
}

// ── Plugins ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginsConfig {
    /// Plugin root directory. Discovery never falls back to a built-in location;
    /// callers decide what to do when this is unset.
    pub path: Option<PathBuf>,
}

// ── Execution ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Number of plugins invoked at once; 0 means one per logical core
    #[serde(default)]
    pub parallel_workers: usize,

    /// Per-plugin deadline in seconds; unset means no deadline
    pub timeout_secs: Option<u64>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 0,
            timeout_secs: None,
        }
    }
}

impl ExecutionConfig {
    /// Effective worker count.
    pub fn workers(&self) -> usize {
        if self.parallel_workers > 0 {
            return self.parallel_workers;
        }
        std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

// ── Container ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Container CLI used to start plugin containers
    #[serde(default = "default_container_binary")]
    pub binary: String,

    /// Run containers with `--privileged`
    #[serde(default)]
    pub privileged: bool,

    /// Pull images that are not present locally
    #[serde(default = "default_true")]
    pub pull_missing: bool,
}

fn default_container_binary() -> String { "docker".to_string() }
fn default_true() -> bool { true }

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            binary: default_container_binary(),
            privileged: false,
            pull_missing: true,
        }
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Names of summaries/metrics to compute
    #[serde(default = "default_metrics")]
    pub metrics: Vec<String>,
}

fn default_metrics() -> Vec<String> {
    vec![
        "Confusion Matrix".to_string(),
        "Sensitivity".to_string(),
        "Specificity".to_string(),
    ]
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { metrics: default_metrics() }
    }
}

// ── Helper Methods ─────────────────────────────────────────────────────────────

impl BenchConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BenchError::Config(e.to_string()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| BenchError::Config(e.to_string()))
    }

    /// Load from a file, picking the parser by extension (`.yaml`/`.yml`, otherwise TOML).
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| BenchError::Config(e.to_string()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
