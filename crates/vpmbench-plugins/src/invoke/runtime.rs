//! Container runtime seam.
//!
//! The containerized strategy only needs "run this image with these mounts and this
//! command, tell me how it exited". [`DockerCli`] does that through the docker CLI;
//! tests substitute a fake.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};
use vpmbench_common::bench_config::ContainerConfig;

use crate::error::ExecutionError;

/// A host path bound into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub source: PathBuf,
    pub target: String,
    pub read_only: bool,
}

impl Mount {
    pub fn read_only(source: impl Into<PathBuf>, target: impl Into<String>) -> Self {
        Self { source: source.into(), target: target.into(), read_only: true }
    }

    pub fn read_write(source: impl Into<PathBuf>, target: impl Into<String>) -> Self {
        Self { source: source.into(), target: target.into(), read_only: false }
    }
}

/// Everything needed to start one container.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub image: String,
    /// Shell command line executed inside the container
    pub command: String,
    pub mounts: Vec<Mount>,
    /// Unique container name, so a timed-out container can be killed
    pub name: String,
    pub timeout: Option<Duration>,
}

/// How a container run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerOutcome {
    pub exit_code: i32,
    /// Captured stdout followed by stderr
    pub output: String,
}

impl ContainerOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Human-readable name for logs
    fn name(&self) -> &'static str;

    /// Run `spec` to completion.
    ///
    /// A missing or unpullable image is [`ExecutionError::Unavailable`]; an expired
    /// deadline is [`ExecutionError::Timeout`] after the container has been killed.
    /// A non-zero exit is *not* an error here: it is reported in the outcome.
    async fn run(&self, spec: &ContainerSpec) -> Result<ContainerOutcome, ExecutionError>;
}

// ── Docker CLI ───────────────────────────────────────────────────────────────

/// [`ContainerRuntime`] backed by the `docker` command line (or a compatible one).
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
    privileged: bool,
    pull_missing: bool,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self { binary: "docker".to_string(), privileged: false, pull_missing: true }
    }
}

impl DockerCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into(), ..Self::default() }
    }

    pub fn from_config(config: &ContainerConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            privileged: config.privileged,
            pull_missing: config.pull_missing,
        }
    }

    async fn cli(&self, args: &[&str]) -> Result<std::process::Output, ExecutionError> {
        Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ExecutionError::Unavailable(format!("cannot start '{}': {e}", self.binary)))
    }

    async fn ensure_image(&self, image: &str) -> Result<(), ExecutionError> {
        if self.cli(&["image", "inspect", image]).await?.status.success() {
            return Ok(());
        }
        if !self.pull_missing {
            return Err(ExecutionError::Unavailable(format!("image '{image}' is not present")));
        }
        info!(image, "Pulling container image");
        let pulled = self.cli(&["pull", image]).await?;
        if !pulled.status.success() {
            let stderr = String::from_utf8_lossy(&pulled.stderr);
            return Err(ExecutionError::Unavailable(format!(
                "cannot pull image '{image}': {}",
                stderr.trim()
            )));
        }
        Ok(())
    }

    /// Arguments for `docker run`.
    pub fn run_args(&self, spec: &ContainerSpec) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--rm".to_string(),
            "--name".to_string(),
            spec.name.clone(),
        ];
        if self.privileged {
            args.push("--privileged".to_string());
        }
        for mount in &spec.mounts {
            let mut value = format!("type=bind,source={},target={}", mount.source.display(), mount.target);
            if mount.read_only {
                value.push_str(",readonly");
            }
            args.push("--mount".to_string());
            args.push(value);
        }
        args.push(spec.image.clone());
        args.push("sh".to_string());
        args.push("-c".to_string());
        args.push(spec.command.clone());
        args
    }

    async fn kill(&self, name: &str) {
        match self.cli(&["kill", name]).await {
            Ok(out) if out.status.success() => debug!(container = name, "Killed container"),
            Ok(out) => warn!(
                container = name,
                stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                "Failed to kill container"
            ),
            Err(e) => warn!(container = name, error = %e, "Failed to kill container"),
        }
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    fn name(&self) -> &'static str {
        "docker"
    }

    async fn run(&self, spec: &ContainerSpec) -> Result<ContainerOutcome, ExecutionError> {
        self.ensure_image(&spec.image).await?;

        let args = self.run_args(spec);
        debug!(container = %spec.name, image = %spec.image, "Starting container");
        let run = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match spec.timeout {
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(container = %spec.name, ?limit, "Container exceeded its deadline");
                    self.kill(&spec.name).await;
                    return Err(ExecutionError::Timeout(limit));
                }
            },
            None => run.await,
        }
        .map_err(|e| ExecutionError::Unavailable(format!("cannot start '{}': {e}", self.binary)))?;

        let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
        captured.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(ContainerOutcome {
            exit_code: output.status.code().unwrap_or(-1),
            output: captured,
        })
    }
}
