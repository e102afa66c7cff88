//! Configuration loading for the vpmbench binary.
//! Reads vpmbench.toml from the current directory, the path in VPMBENCH_CONFIG, or the
//! path given with --config.

use std::path::{Path, PathBuf};

use anyhow::Context;
use vpmbench_common::BenchConfig;

pub const CONFIG_ENV: &str = "VPMBENCH_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "vpmbench.toml";
pub const DEFAULT_PLUGIN_DIR: &str = "plugins";

/// Where the configuration comes from, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` or `VPMBENCH_CONFIG`; the file must exist
    Explicit(PathBuf),
    /// `vpmbench.toml` in the working directory, if present
    Implicit(PathBuf),
}

impl ConfigSource {
    pub fn resolve(flag: Option<&Path>, env: Option<String>) -> Self {
        match flag.map(Path::to_path_buf).or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from)) {
            Some(path) => ConfigSource::Explicit(path),
            None => ConfigSource::Implicit(PathBuf::from(DEFAULT_CONFIG_FILE)),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::Explicit(p) | ConfigSource::Implicit(p) => p,
        }
    }
}

/// Load the run configuration. A missing implicit file yields the defaults.
pub fn load(flag: Option<&Path>) -> anyhow::Result<BenchConfig> {
    let source = ConfigSource::resolve(flag, std::env::var(CONFIG_ENV).ok());
    load_from(&source)
}

pub fn load_from(source: &ConfigSource) -> anyhow::Result<BenchConfig> {
    let path = source.path();
    if !path.exists() {
        if let ConfigSource::Explicit(_) = source {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        tracing::debug!("No {} in working directory, using defaults", DEFAULT_CONFIG_FILE);
        return Ok(BenchConfig::default());
    }
    let config = BenchConfig::from_path(path)
        .with_context(|| format!("Could not load {}", path.display()))?;
    tracing::info!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Plugin root: command-line value, then `plugins.path`, then `./plugins`.
pub fn plugin_root(config: &BenchConfig, flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| config.plugins.path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PLUGIN_DIR))
}
